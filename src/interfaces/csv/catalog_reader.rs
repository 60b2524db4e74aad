use crate::domain::product::Product;
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads catalog products from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<Product>`. It handles whitespace trimming and flexible record
/// lengths automatically. Expected columns: `id,name,price_cents,stock`.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes products, so a
    /// large catalog never has to sit in memory at once.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Cents;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, name, price_cents, stock\np1, Widget, 500, 10\np2, Gadget, 250, 3";
        let reader = CatalogReader::new(data.as_bytes());
        let results: Vec<Result<Product>> = reader.products().collect();

        assert_eq!(results.len(), 2);
        let p1 = results[0].as_ref().unwrap();
        assert_eq!(p1.id, "p1");
        assert_eq!(p1.name, "Widget");
        assert_eq!(p1.price_cents, Cents::new(500));
        assert_eq!(p1.stock, 10);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "id, name, price_cents, stock\np1, Widget, not-a-price, 10";
        let reader = CatalogReader::new(data.as_bytes());
        let results: Vec<Result<Product>> = reader.products().collect();

        assert!(results[0].is_err());
    }
}
