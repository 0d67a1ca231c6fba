// Mobile Price Wizard - Core Library
// Price estimation, QR encoding and export for the TUI and CLI front-ends

pub mod catalog;
pub mod pricing;
pub mod payload;
pub mod qr;
pub mod export;
pub mod config;
pub mod wizard;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use catalog::{
    label_for, LabeledOption, NamedOption,
    AGE_OPTIONS, BRANDS, CONDITION_OPTIONS, STORAGE_OPTIONS,
};
pub use pricing::{
    DeviceAttributes, EstimateError, Field, PriceEstimate, PricingTable, PricingTableError,
    BASE_PRICE, NEUTRAL_MULTIPLIER,
};
pub use payload::{
    select_payload, first_non_empty, price_caption, PayloadSource,
    CustomText, PriceCaption, StaticFallback, FALLBACK_PAYLOAD,
};
pub use qr::{encode, QrError, QrImage, QrStyle, EXPORT_FILE_NAME};
pub use export::{
    Clipboard, CommandShareTarget, ExportError, ExportOutcome, Exporter, NoShareTarget,
    ShareError, ShareOutcome, ShareRequest, ShareTarget, SystemClipboard,
};
pub use config::{ConfigError, WizardConfig};
pub use wizard::{EncoderState, Notice, NoticeKind, View, Wizard};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
