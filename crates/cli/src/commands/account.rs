//! `login`, `logout`, `register` and `orders`.

use std::io::Write;

use secrecy::SecretString;
use shopfront_storefront::Storefront;
use shopfront_storefront::accounts::{Credentials, RegistrationForm};

use super::{AccountArgs, RegisterArgs, cart_lines};
use crate::CliError;

pub async fn login(
    storefront: &mut Storefront,
    args: AccountArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let credentials = Credentials::new(args.username, args.password);
    let report = storefront.sign_in(&credentials).await?;

    writeln!(out, "Signed in as {}.", credentials.username.trim())?;
    if report.units_merged > 0 {
        writeln!(
            out,
            "Moved {} item(s) from this device into your cart.",
            report.units_merged
        )?;
    }
    if !report.is_complete() {
        writeln!(
            out,
            "{} item(s) could not be moved and were dropped.",
            report.units_failed + report.units_skipped
        )?;
    }
    Ok(())
}

pub fn logout(storefront: &mut Storefront, out: &mut impl Write) -> Result<(), CliError> {
    storefront.sign_out()?;
    writeln!(out, "Signed out.")?;
    Ok(())
}

pub async fn register(
    storefront: &Storefront,
    args: RegisterArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let form = RegistrationForm {
        username: args.username,
        email: args.email,
        phone: args.phone,
        password: SecretString::from(args.password),
        password_confirmation: SecretString::from(args.password_confirmation),
    };
    storefront.register(&form).await?;
    writeln!(out, "Account created. Sign in with `shopfront login`.")?;
    Ok(())
}

pub async fn orders(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let currency = storefront.config().currency;
    let orders = storefront.orders().await?;
    if orders.is_empty() {
        writeln!(out, "No orders yet.")?;
        return Ok(());
    }

    for order in &orders {
        let placed = order
            .placed_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        writeln!(
            out,
            "Order #{}  {placed}  {}  {} item(s)  {}",
            order.id,
            order.status,
            order.item_count(),
            order.total(currency).display()
        )?;
        for line in cart_lines(&order.items, currency) {
            writeln!(out, "    {line}")?;
        }
        if let Some(address) = &order.shipping_address {
            writeln!(
                out,
                "    Ship to: {}, {}, {} {}",
                address.address, address.city, address.state, address.zipcode
            )?;
        }
    }
    Ok(())
}
