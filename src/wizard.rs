// 🧭 Wizard Shell - view selection and the last computed price
// The price is owned here and passed down to the encoder per request

use crate::export::{
    Clipboard, ExportError, ExportOutcome, Exporter, ShareError, ShareOutcome, ShareTarget,
};
use crate::payload::select_payload;
use crate::pricing::{DeviceAttributes, EstimateError, PriceEstimate, PricingTable};
use crate::qr::{encode, QrError, QrImage, QrStyle};

// ============================================================================
// VIEW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Estimator,
    Encoder,
}

impl View {
    pub fn toggle(&self) -> Self {
        match self {
            View::Estimator => View::Encoder,
            View::Encoder => View::Estimator,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            View::Estimator => "Price Calculator",
            View::Encoder => "QR Code Generator",
        }
    }
}

// ============================================================================
// NOTICES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Last user-facing message, shown in the status area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

// ============================================================================
// ENCODER STATE
// ============================================================================

#[derive(Debug, Default)]
pub struct EncoderState {
    pub custom_text: String,
    image: Option<QrImage>,
}

impl EncoderState {
    pub fn image(&self) -> Option<&QrImage> {
        self.image.as_ref()
    }

    /// What the next generation would encode given `price`
    pub fn pending_payload(&self, price: Option<PriceEstimate>) -> String {
        select_payload(&self.custom_text, price)
    }

    /// Encode the selected payload. On failure the previous image stays.
    pub fn generate(
        &mut self,
        price: Option<PriceEstimate>,
        style: &QrStyle,
    ) -> Result<&QrImage, QrError> {
        let payload = self.pending_payload(price);
        let image = encode(&payload, style)?;
        Ok(self.image.insert(image))
    }
}

// ============================================================================
// WIZARD
// ============================================================================

pub struct Wizard {
    view: View,
    last_price: Option<PriceEstimate>,
    pub attributes: DeviceAttributes,
    pub encoder: EncoderState,
    notice: Option<Notice>,
    pricing: PricingTable,
    style: QrStyle,
}

impl Wizard {
    pub fn new(pricing: PricingTable) -> Self {
        Wizard {
            view: View::default(),
            last_price: None,
            attributes: DeviceAttributes::default(),
            encoder: EncoderState::default(),
            notice: None,
            pricing,
            style: QrStyle::default(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
    }

    pub fn last_price(&self) -> Option<PriceEstimate> {
        self.last_price
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Estimate from the current form. A refused estimate leaves the last
    /// price untouched.
    pub fn calculate(&mut self) -> Result<PriceEstimate, EstimateError> {
        match self.pricing.estimate(&self.attributes) {
            Ok(price) => {
                self.last_price = Some(price);
                self.notice = Some(Notice::info(format!("Estimated Price: {}", price)));
                Ok(price)
            }
            Err(e) => {
                self.notice = Some(Notice::error("Please fill in all fields"));
                Err(e)
            }
        }
    }

    pub fn generate_qr(&mut self) -> Result<&QrImage, QrError> {
        let price = self.last_price;
        match self.encoder.generate(price, &self.style) {
            Ok(image) => {
                self.notice = Some(Notice::info("QR code generated"));
                Ok(image)
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating QR code");
                self.notice = Some(Notice::error("Error generating QR code"));
                Err(e)
            }
        }
    }

    pub fn download(&mut self, exporter: &Exporter) -> Result<ExportOutcome, ExportError> {
        let result = exporter.download(self.encoder.image());
        match &result {
            Ok(ExportOutcome::Saved(path)) => {
                self.notice = Some(Notice::info(format!("Saved {}", path.display())));
            }
            Ok(ExportOutcome::NothingToExport) => self.clear_notice(),
            Err(e) => {
                tracing::error!(error = %e, "error saving QR code");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
        result
    }

    pub fn share(
        &mut self,
        exporter: &Exporter,
        target: &dyn ShareTarget,
        clipboard: &mut dyn Clipboard,
    ) -> Result<ShareOutcome, ShareError> {
        let result = exporter.share(self.encoder.image(), target, clipboard);
        match &result {
            Ok(outcome) => match outcome.message() {
                Some(message) => self.notice = Some(Notice::info(message)),
                None => self.clear_notice(),
            },
            Err(e) => {
                tracing::error!(error = %e, "error sharing QR code");
                self.notice = Some(Notice::error("Error sharing QR code"));
            }
        }
        result
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(PricingTable::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
