//! `wishlist show|add|remove`.

use std::io::Write;

use shopfront_core::ProductId;
use shopfront_storefront::{AppError, Storefront};

use super::{WishlistCommand, product_line};
use crate::CliError;

pub async fn run(
    storefront: &mut Storefront,
    command: WishlistCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if !storefront.session().is_authenticated() {
        return Err(AppError::SignInRequired.into());
    }

    match command {
        WishlistCommand::Show => {
            storefront.wishlist_mut().fetch().await?;
        }
        WishlistCommand::Add { id } => storefront.add_to_wishlist(ProductId::new(id)).await?,
        WishlistCommand::Remove { id } => {
            storefront.wishlist_mut().remove(ProductId::new(id)).await?;
        }
    }

    let currency = storefront.config().currency;
    let wishlist = storefront.wishlist().snapshot();
    if wishlist.is_empty() {
        writeln!(out, "Your wishlist is empty.")?;
    }
    for entry in wishlist.entries() {
        writeln!(out, "{}", product_line(&entry.product, currency))?;
    }
    Ok(())
}
