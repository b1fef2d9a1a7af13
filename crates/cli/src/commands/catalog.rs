//! `products`, `product` and `banner`.

use std::io::Write;

use shopfront_core::ProductId;
use shopfront_storefront::Storefront;

use super::product_line;
use crate::CliError;

pub async fn products(
    storefront: &mut Storefront,
    search: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let currency = storefront.config().currency;
    let products = storefront.catalog_mut().search(search).await?;

    if products.is_empty() {
        match storefront.catalog().last_query() {
            Some(query) => writeln!(out, "No products match \"{query}\".")?,
            None => writeln!(out, "No products yet.")?,
        }
        return Ok(());
    }
    for product in &products {
        writeln!(out, "{}", product_line(product, currency))?;
    }
    Ok(())
}

pub async fn product(
    storefront: &mut Storefront,
    id: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let currency = storefront.config().currency;
    let product = storefront.catalog().product(ProductId::new(id)).await?;

    writeln!(out, "{}", product_line(&product, currency))?;
    if let Some(image) = &product.image {
        writeln!(out, "Image: {image}")?;
    }
    if storefront.session().is_authenticated() {
        let liked = storefront.wishlist_mut().fetch().await?.contains(product.id);
        writeln!(out, "In wishlist: {}", if liked { "yes" } else { "no" })?;
    }
    Ok(())
}

pub async fn banner(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    match storefront.catalog().banner().await? {
        Some(banner) => {
            writeln!(out, "{}", banner.name)?;
            if let Some(image) = &banner.image {
                writeln!(out, "Image: {image}")?;
            }
        }
        None => writeln!(out, "No banner.")?,
    }
    Ok(())
}
