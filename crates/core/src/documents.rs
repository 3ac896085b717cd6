//! Deterministic file names for generated member documents.
//!
//! Cards are keyed on the member id, receipts on the claim's receipt number,
//! so a document can be located again without storing its path.

use crate::types::DbId;

/// Directory (under the media root) that holds membership cards.
pub const CARDS_DIR: &str = "cartes";

/// `carte_{id}.{ext}`
pub fn card_filename(adherent_id: DbId, extension: &str) -> String {
    format!("carte_{adherent_id}.{extension}")
}

/// `recu_{num_recu}.{ext}`, with the receipt number percent-encoded.
///
/// Everything outside `[A-Za-z0-9-._~]` is escaped, `%` included, so
/// distinct receipt numbers never share a file and separators never reach
/// the path.
pub fn receipt_filename(num_recu: &str, extension: &str) -> String {
    format!("recu_{}.{extension}", urlencoding::encode(num_recu))
}
