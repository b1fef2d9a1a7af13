//! `checkout start|confirm`.
//!
//! The payment itself is collected by the provider's widget outside this
//! program: `start` prints the session the widget is opened with, and
//! `confirm` reports what the widget handed back.

use std::io::Write;

use shopfront_storefront::Storefront;
use shopfront_storefront::api::PaymentConfirmation;
use shopfront_storefront::checkout::ShippingAddress;

use super::CheckoutCommand;
use crate::CliError;

pub async fn run(
    storefront: &mut Storefront,
    command: CheckoutCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        CheckoutCommand::Start { shipping } => {
            let address = ShippingAddress::from(shipping);
            let session = storefront.start_checkout(&address).await?;
            if let Ok(amount) = session.amount_major() {
                writeln!(out, "Amount due: {}", amount.display())?;
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&session)?)?;
        }
        CheckoutCommand::Confirm {
            payment_id,
            order_id,
            signature,
            shipping,
        } => {
            let confirmation = PaymentConfirmation {
                razorpay_payment_id: payment_id,
                razorpay_order_id: order_id,
                razorpay_signature: signature,
            };
            let address = ShippingAddress::from(shipping);
            let placed = storefront
                .confirm_checkout(&confirmation, &address)
                .await?;
            writeln!(out, "Order #{placed} placed. Thank you!")?;
        }
    }
    Ok(())
}
