use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes an order report as CSV.
///
/// Columns: `id,owner_id,items,amount_cents,paid,created_at`. The `items`
/// column carries the line items as a JSON array so the report stays one row
/// per order regardless of cart size.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<Order>) -> Result<()> {
        self.writer.write_record([
            "id",
            "owner_id",
            "items",
            "amount_cents",
            "paid",
            "created_at",
        ])?;

        for order in orders {
            let items_json = serde_json::to_string(&order.items)?;
            let amount = order.amount_cents.value().to_string();
            let created_at = order.created_at.to_rfc3339();
            self.writer.write_record([
                order.id.as_str(),
                order.owner_id.as_str(),
                items_json.as_str(),
                amount.as_str(),
                if order.paid { "true" } else { "false" },
                created_at.as_str(),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
