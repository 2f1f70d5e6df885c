//! Order fixtures.

use chrono::Utc;

use tillwise_domain::id::{OrderId, ShopId};
use tillwise_domain::order::{Order, OrderItem, OrderStatus};

/// PIN used for seeded staff in integration tests.
pub const TEST_PIN: &str = "4821";

pub fn sample_items() -> Vec<OrderItem> {
    vec![
        OrderItem {
            name: "Flat white".into(),
            quantity: 2,
            unit_price: 450,
        },
        OrderItem {
            name: "Banana bread".into(),
            quantity: 1,
            unit_price: 380,
        },
    ]
}

/// Builds [`Order`] values. Totals follow the items unless set explicitly.
pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    pub fn new(shop_id: ShopId) -> Self {
        let items = sample_items();
        let total_amount = total_of(&items);
        Self {
            order: Order {
                id: OrderId::new(),
                shop_id,
                status: OrderStatus::New,
                items,
                total_amount,
                created_at: Utc::now(),
            },
        }
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.order.status = status;
        self
    }

    pub fn items(mut self, items: Vec<OrderItem>) -> Self {
        self.order.total_amount = total_of(&items);
        self.order.items = items;
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}

/// Shorthand for `OrderBuilder::new(shop_id).status(status).build()`.
pub fn order_in(shop_id: ShopId, status: OrderStatus) -> Order {
    OrderBuilder::new(shop_id).status(status).build()
}

fn total_of(items: &[OrderItem]) -> i64 {
    items
        .iter()
        .map(|item| item.unit_price * i64::from(item.quantity))
        .sum()
}
