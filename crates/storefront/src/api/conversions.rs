//! Conversions from wire DTOs to domain types.

use chrono::DateTime;
use shopfront_core::{Cart, CartLine, OrderStatus, Product, Wishlist, WishlistEntry};
use tracing::warn;

use super::types::{OrderDto, OrderItemDto, ProductDto, ShippingAddressDto, WishlistItemDto};
use crate::checkout::ShippingAddress;
use crate::orders::Order;

pub(super) fn convert_product(dto: ProductDto) -> Product {
    Product {
        id: dto.id,
        name: dto.name.unwrap_or_default(),
        price: dto.price,
        digital: dto.digital.unwrap_or(false),
        image: dto.image.filter(|url| !url.is_empty()),
    }
}

/// Lines whose product was deleted or whose quantity is not positive are
/// skipped.
fn convert_line(dto: OrderItemDto) -> Option<CartLine> {
    let Some(product) = dto.product else {
        warn!(order_item_id = ?dto.id, "Skipping order item without a product");
        return None;
    };
    let quantity = dto
        .quantity
        .and_then(|q| u32::try_from(q).ok())
        .filter(|q| *q > 0);
    let Some(quantity) = quantity else {
        warn!(
            order_item_id = ?dto.id,
            product_id = %product.id,
            quantity = ?dto.quantity,
            "Skipping order item with non-positive quantity"
        );
        return None;
    };
    let product = convert_product(product);
    Some(CartLine {
        product_id: product.id,
        quantity,
        unit_price: product.price,
        product,
    })
}

pub(super) fn convert_cart(items: Vec<OrderItemDto>) -> Cart {
    Cart::from_lines(items.into_iter().filter_map(convert_line))
}

pub(super) fn convert_wishlist(items: Vec<WishlistItemDto>) -> Wishlist {
    Wishlist::from_entries(items.into_iter().filter_map(|item| {
        if item.product.is_none() {
            warn!(wishlist_item_id = ?item.id, "Skipping wishlist item without a product");
        }
        item.product
            .map(|product| WishlistEntry::new(convert_product(product)))
    }))
}

fn convert_shipping_address(dto: ShippingAddressDto) -> Option<ShippingAddress> {
    let address = ShippingAddress {
        address: dto.address.unwrap_or_default(),
        city: dto.city.unwrap_or_default(),
        state: dto.state.unwrap_or_default(),
        zipcode: dto.zipcode.unwrap_or_default(),
    };
    // The server serializes a missing address as an object of blanks.
    if address.is_blank() {
        None
    } else {
        Some(address)
    }
}

pub(super) fn convert_order(dto: OrderDto) -> Order {
    let placed_at = dto.date_ordered.as_deref().and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .inspect_err(|e| warn!(order_id = %dto.id, error = %e, "Unparseable order date"))
            .ok()
    });
    Order {
        id: dto.id,
        transaction_id: dto.transaction_id.filter(|t| !t.is_empty()),
        status: OrderStatus::from_completed(dto.completed),
        placed_at,
        items: convert_cart(dto.orderitems),
        shipping_address: dto.shipping_address.and_then(convert_shipping_address),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{OrderId, ProductId};

    use super::*;

    fn order(json: &str) -> OrderDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_convert_product_defaults() {
        let dto: ProductDto =
            serde_json::from_str(r#"{"id":3,"name":null,"price":"9.50","digital":null,"image":""}"#)
                .unwrap();
        let product = convert_product(dto);
        assert_eq!(product.name, "");
        assert!(!product.digital);
        assert!(product.image.is_none());
        assert_eq!(product.price, Decimal::new(950, 2));
    }

    #[test]
    fn test_cart_skips_deleted_products_and_bad_quantities() {
        let dto = order(
            r#"{"id":1,"orderitems":[
                {"id":10,"product":{"id":1,"name":"A","price":"100.00"},"quantity":2},
                {"id":11,"product":null,"quantity":1},
                {"id":12,"product":{"id":2,"name":"B","price":"5.00"},"quantity":0},
                {"id":13,"product":{"id":3,"name":"C","price":"5.00"},"quantity":null}
            ]}"#,
        );
        let cart = convert_cart(dto.orderitems);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
        assert_eq!(cart.subtotal(), Decimal::new(200, 0));
    }

    #[test]
    fn test_wishlist_skips_null_products_and_dedupes() {
        let items: Vec<WishlistItemDto> = serde_json::from_str(
            r#"[
                {"id":1,"product":{"id":5,"name":"Lamp","price":"10.00"}},
                {"id":2,"product":null},
                {"id":3,"product":{"id":5,"name":"Lamp","price":"10.00"}}
            ]"#,
        )
        .unwrap();
        let wishlist = convert_wishlist(items);
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.contains(ProductId::new(5)));
    }

    #[test]
    fn test_convert_order() {
        let dto = order(
            r#"{"id":42,"date_ordered":"2024-03-01T10:15:00.123456Z","completed":true,
                "transaction_id":"pay_123","shipping_address":{"id":1,"address":"1 Main St","city":"Pune","state":"MH","zipcode":"411001"},
                "orderitems":[{"id":1,"product":{"id":1,"name":"A","price":"100.00"},"quantity":1}]}"#,
        );
        let order = convert_order(dto);
        assert_eq!(order.id, OrderId::new(42));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.transaction_id.as_deref(), Some("pay_123"));
        assert!(order.placed_at.is_some());
        assert_eq!(order.shipping_address.unwrap().city, "Pune");
        assert_eq!(order.items.item_count(), 1);
    }

    #[test]
    fn test_blank_shipping_address_and_bad_date_become_none() {
        let dto = order(
            r#"{"id":1,"date_ordered":"yesterday","completed":false,
                "shipping_address":{"address":"","city":"","state":"","zipcode":""}}"#,
        );
        let order = convert_order(dto);
        assert!(order.placed_at.is_none());
        assert!(order.shipping_address.is_none());
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.items.is_empty());
    }
}
