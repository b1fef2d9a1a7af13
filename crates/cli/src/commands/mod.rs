//! Subcommand arguments and handlers.

use clap::{Args, Subcommand};
use shopfront_core::{Cart, CurrencyCode, Price, Product};
use shopfront_storefront::checkout::ShippingAddress;

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add { id: i64 },
    /// Remove one unit of a product
    Decrease { id: i64 },
    /// Remove a product's whole line
    Remove { id: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Show liked products
    Show,
    /// Like a product
    Add { id: i64 },
    /// Unlike a product
    Remove { id: i64 },
}

#[derive(Args)]
pub struct AccountArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Repeat the password
    #[arg(long, env = "SHOPFRONT_PASSWORD_CONFIRMATION", hide_env_values = true)]
    pub password_confirmation: String,
}

#[derive(Args)]
pub struct ShippingArgs {
    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub zipcode: String,
}

impl From<ShippingArgs> for ShippingAddress {
    fn from(args: ShippingArgs) -> Self {
        Self {
            address: args.address,
            city: args.city,
            state: args.state,
            zipcode: args.zipcode,
        }
    }
}

#[derive(Subcommand)]
pub enum CheckoutCommand {
    /// Open a payment and print what the payment widget needs
    Start {
        #[command(flatten)]
        shipping: ShippingArgs,
    },
    /// Report a completed payment and place the order
    Confirm {
        #[arg(long)]
        payment_id: String,

        #[arg(long)]
        order_id: String,

        #[arg(long)]
        signature: String,

        #[command(flatten)]
        shipping: ShippingArgs,
    },
}

// =============================================================================
// Formatting
// =============================================================================

fn product_line(product: &Product, currency: CurrencyCode) -> String {
    let kind = if product.digital { "  (digital)" } else { "" };
    format!(
        "#{:<5} {:<40} {:>12}{kind}",
        product.id.to_string(),
        product.name,
        Price::new(product.price, currency).display()
    )
}

fn cart_lines(cart: &Cart, currency: CurrencyCode) -> Vec<String> {
    cart.lines()
        .iter()
        .map(|line| {
            format!(
                "#{:<5} {:<40} {:>3} x {:>10} = {:>12}",
                line.product_id.to_string(),
                line.product.name,
                line.quantity,
                Price::new(line.unit_price, currency).display(),
                Price::new(line.line_total(), currency).display()
            )
        })
        .collect()
}
