//! Membership cards and claim receipts.
//!
//! A [`DocumentRenderer`] turns a [`Document`] into bytes; the
//! [`DocumentService`] decides where those bytes live on disk:
//!
//! ```text
//! {media_root}/cartes/carte_{id}.{ext}
//! {receipts_dir}/recu_{num_recu}.{ext}
//! ```
//!
//! The shipped renderer emits standalone HTML. A PDF backend implements the
//! same trait and reports its own extension and content type.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mutuelle_core::documents::{card_filename, receipt_filename, CARDS_DIR};
use mutuelle_core::types::{Date, DbId};
use mutuelle_db::models::adherent::Adherent;
use mutuelle_db::models::soin::SoinWithAdherent;

/// Errors raised while producing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Render failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to render.
#[derive(Debug, Clone, Copy)]
pub enum Document<'a> {
    /// Membership card for a member.
    Card(&'a Adherent),
    /// Receipt for a claim.
    Receipt(&'a SoinWithAdherent),
}

/// Turns a [`Document`] into file contents.
pub trait DocumentRenderer: Send + Sync {
    /// File extension without the dot, e.g. `html` or `pdf`.
    fn extension(&self) -> &'static str;

    /// MIME type served with the rendered bytes.
    fn content_type(&self) -> &'static str;

    fn render(&self, document: Document<'_>) -> Result<Vec<u8>, DocumentError>;
}

/// A rendered document ready to be written or served.
#[derive(Debug)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders and stores cards and receipts.
pub struct DocumentService {
    renderer: Arc<dyn DocumentRenderer>,
    media_root: PathBuf,
    receipts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        renderer: Arc<dyn DocumentRenderer>,
        media_root: impl Into<PathBuf>,
        receipts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            media_root: media_root.into(),
            receipts_dir: receipts_dir.into(),
        }
    }

    /// Where the card of member `adherent_id` is stored.
    pub fn card_path(&self, adherent_id: DbId) -> PathBuf {
        self.media_root
            .join(CARDS_DIR)
            .join(card_filename(adherent_id, self.renderer.extension()))
    }

    /// Where the receipt numbered `num_recu` is stored.
    pub fn receipt_path(&self, num_recu: &str) -> PathBuf {
        self.receipts_dir
            .join(receipt_filename(num_recu, self.renderer.extension()))
    }

    /// Render a member's card without touching the disk.
    pub fn render_card(&self, adherent: &Adherent) -> Result<RenderedDocument, DocumentError> {
        Ok(RenderedDocument {
            filename: card_filename(adherent.id, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes: self.renderer.render(Document::Card(adherent))?,
        })
    }

    /// Render a claim's receipt without touching the disk.
    pub fn render_receipt(
        &self,
        soin: &SoinWithAdherent,
    ) -> Result<RenderedDocument, DocumentError> {
        Ok(RenderedDocument {
            filename: receipt_filename(&soin.soin.num_recu, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes: self.renderer.render(Document::Receipt(soin))?,
        })
    }

    /// Render and store a member's card, replacing any previous file.
    pub async fn write_card(&self, adherent: &Adherent) -> Result<PathBuf, DocumentError> {
        let rendered = self.render_card(adherent)?;
        let path = self.card_path(adherent.id);
        write_file(&path, &rendered.bytes).await?;
        Ok(path)
    }

    /// Render and store a claim's receipt, replacing any previous file.
    pub async fn write_receipt(&self, soin: &SoinWithAdherent) -> Result<PathBuf, DocumentError> {
        let rendered = self.render_receipt(soin)?;
        let path = self.receipt_path(&soin.soin.num_recu);
        write_file(&path, &rendered.bytes).await?;
        Ok(path)
    }

    /// [`Self::write_card`], logging instead of failing.
    ///
    /// Runs after the member is committed; the write stands either way.
    pub async fn generate_card(&self, adherent: &Adherent) {
        match self.write_card(adherent).await {
            Ok(path) => {
                tracing::info!(adherent_id = adherent.id, path = %path.display(), "Card generated")
            }
            Err(e) => {
                tracing::error!(adherent_id = adherent.id, error = %e, "Card generation failed")
            }
        }
    }

    /// [`Self::write_receipt`], logging instead of failing.
    pub async fn generate_receipt(&self, soin: &SoinWithAdherent) {
        match self.write_receipt(soin).await {
            Ok(path) => {
                tracing::info!(soin_id = soin.soin.id, path = %path.display(), "Receipt generated")
            }
            Err(e) => {
                tracing::error!(soin_id = soin.soin.id, error = %e, "Receipt generation failed")
            }
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

// ---------------------------------------------------------------------------
// HTML renderer
// ---------------------------------------------------------------------------

/// Self-contained HTML documents with inline styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
    .doc{border:2px solid #1f4e79;border-radius:8px;padding:1.5em;max-width:32em}\
    h1{color:#1f4e79;font-size:1.4em;margin-top:0}\
    th{text-align:left;padding-right:1.5em;color:#555}";

impl DocumentRenderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn render(&self, document: Document<'_>) -> Result<Vec<u8>, DocumentError> {
        let (title, rows) = match document {
            Document::Card(a) => (
                "Carte de mutuelle",
                vec![
                    ("Nom", a.nom.clone()),
                    ("Prénom", a.prenom.clone()),
                    ("CIN", a.cin.clone()),
                    ("N° adhérent", a.nax.clone()),
                    ("Date de recrutement", format_date(a.date_recrutement)),
                ],
            ),
            Document::Receipt(s) => (
                "Reçu de dossier de soins",
                vec![
                    ("N° reçu", s.soin.num_recu.clone()),
                    ("Adhérent", format!("{} {}", s.adherent.nom, s.adherent.prenom)),
                    ("CIN", s.adherent.cin.clone()),
                    ("N° adhérent", s.adherent.nax.clone()),
                    ("Bénéficiaire", s.soin.type_beneficier.clone()),
                    ("Statut du dossier", s.soin.statut_dossier.to_string()),
                    ("Montant", format!("{} MAD", s.soin.montant_dossier)),
                    ("Date des soins", format_date(Some(s.soin.date_soin))),
                    ("Fin des soins", format_date(Some(s.soin.date_fin_soin))),
                ],
            ),
        };

        let mut html = String::new();
        write!(
            html,
            "<!DOCTYPE html><html lang=\"fr\"><head><meta charset=\"utf-8\">\
             <title>{title}</title><style>{STYLE}</style></head>\
             <body><div class=\"doc\"><h1>{title}</h1><table>"
        )
        .map_err(|e| DocumentError::Render(e.to_string()))?;
        for (label, value) in rows {
            write!(html, "<tr><th>{label}</th><td>{}</td></tr>", escape_html(&value))
                .map_err(|e| DocumentError::Render(e.to_string()))?;
        }
        html.push_str("</table></div></body></html>");

        Ok(html.into_bytes())
    }
}

/// `dd/mm/yyyy`, or empty when absent.
fn format_date(date: Option<Date>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
