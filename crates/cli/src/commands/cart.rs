//! `cart show|add|decrease|remove|clear`.

use std::io::Write;

use shopfront_core::ProductId;
use shopfront_storefront::Storefront;
use shopfront_storefront::cart::CartMode;

use super::{CartCommand, cart_lines};
use crate::CliError;

pub async fn run(
    storefront: &mut Storefront,
    command: CartCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    // Line quantities come from the displayed cart, which starts empty.
    storefront.cart_mut().refresh().await?;

    match command {
        CartCommand::Show => {}
        CartCommand::Add { id } => storefront.add_to_cart(ProductId::new(id)).await?,
        CartCommand::Decrease { id } => {
            storefront.cart_mut().decrease(ProductId::new(id)).await?;
        }
        CartCommand::Remove { id } => {
            storefront.cart_mut().remove_line(ProductId::new(id)).await?;
        }
        CartCommand::Clear => storefront.cart_mut().clear().await?,
    }
    show(storefront, out)
}

fn show(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let cart = storefront.cart();
    if cart.cart().is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    for line in cart_lines(cart.cart(), cart.currency()) {
        writeln!(out, "{line}")?;
    }
    let place = match cart.mode() {
        CartMode::Anonymous => "on this device",
        CartMode::Authenticated => "in your account",
    };
    writeln!(
        out,
        "{} item(s), total {} ({place})",
        cart.count(),
        cart.total().display()
    )?;
    Ok(())
}
