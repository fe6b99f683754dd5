use breadbox_core::{CartEntryId, Price, ProductId};

/// A cart entry joined with the current catalog facts for its product.
///
/// `price` is the live catalog price, not a snapshot. Carts reprice on
/// every read; only checkout freezes prices into the sale ledger.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub entry_id: CartEntryId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
}
