//! User-facing messages in English and Vietnamese.
//!
//! Messages that came from the server are shown verbatim in every locale.

use kart::{checkout::CheckoutError, rules::RuleError};

use crate::sync::{CartSyncError, IncreaseOutcome, LargeQuantityPrompt, StockShortfall};

/// Language of user-facing messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    /// English
    En,

    /// Vietnamese
    #[default]
    Vi,
}

/// Something that can be shown to the user.
pub trait Localized {
    /// Message in `locale`.
    fn localized(&self, locale: Locale) -> String;
}

impl Localized for CartSyncError {
    fn localized(&self, locale: Locale) -> String {
        let message = match (self, locale) {
            (Self::Rejected { message, .. }, _) => return message.clone(),
            (Self::AuthRequired, Locale::En) => "Please sign in to continue.",
            (Self::AuthRequired, Locale::Vi) => "Vui lòng đăng nhập để tiếp tục.",
            (Self::Network(_), Locale::En) => {
                "Could not reach the server. Check your connection and try again."
            }
            (Self::Network(_), Locale::Vi) => {
                "Không thể kết nối máy chủ. Vui lòng kiểm tra kết nối và thử lại."
            }
            (Self::TimedOut(_), Locale::En) => {
                "The server took too long to respond. Please try again."
            }
            (Self::TimedOut(_), Locale::Vi) => "Máy chủ phản hồi quá lâu. Vui lòng thử lại.",
            (Self::Protocol(_), Locale::En) => "Something went wrong. Please try again later.",
            (Self::Protocol(_), Locale::Vi) => "Đã có lỗi xảy ra. Vui lòng thử lại sau.",
            (Self::InvalidQuantity(RuleError::ZeroDelta), Locale::En) => {
                "Quantity must be at least 1."
            }
            (Self::InvalidQuantity(RuleError::ZeroDelta), Locale::Vi) => {
                "Số lượng phải lớn hơn 0."
            }
            (Self::InvalidQuantity(RuleError::Overflow { .. }), Locale::En) => {
                "That quantity is too large."
            }
            (Self::InvalidQuantity(RuleError::Overflow { .. }), Locale::Vi) => {
                "Số lượng quá lớn."
            }
            (Self::NothingToAdjust, Locale::En) => "This product is out of stock.",
            (Self::NothingToAdjust, Locale::Vi) => "Sản phẩm đã hết hàng.",
        };

        message.to_string()
    }
}

impl Localized for StockShortfall {
    fn localized(&self, locale: Locale) -> String {
        if let Some(message) = self.message.as_ref().filter(|message| !message.trim().is_empty()) {
            return message.clone();
        }

        match locale {
            Locale::En => format!("Only {} left in stock.", self.available),
            Locale::Vi => format!("Chỉ còn {} sản phẩm trong kho.", self.available),
        }
    }
}

impl Localized for LargeQuantityPrompt {
    fn localized(&self, locale: Locale) -> String {
        match locale {
            Locale::En => format!(
                "You are about to order {} units of this product. Continue?",
                self.prospective
            ),
            Locale::Vi => format!(
                "Bạn đang đặt {} sản phẩm này. Bạn có chắc chắn muốn tiếp tục?",
                self.prospective
            ),
        }
    }
}

impl Localized for IncreaseOutcome {
    fn localized(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Applied { .. }, Locale::En) => "Added to cart.".to_string(),
            (Self::Applied { .. }, Locale::Vi) => "Đã thêm vào giỏ hàng.".to_string(),
            (Self::StockExceeded(shortfall), _) => shortfall.localized(locale),
            (Self::NeedsConfirmation(prompt), _) => prompt.localized(locale),
        }
    }
}

impl Localized for CheckoutError {
    fn localized(&self, locale: Locale) -> String {
        let message = match (self, locale) {
            (Self::NoItemsSelected, Locale::En) => "Please select at least one item.",
            (Self::NoItemsSelected, Locale::Vi) => "Vui lòng chọn ít nhất một sản phẩm.",
            (Self::UnavailableItems(_), Locale::En) => {
                "Some selected items are no longer available."
            }
            (Self::UnavailableItems(_), Locale::Vi) => {
                "Một số sản phẩm đã chọn hiện không còn kinh doanh."
            }
            (Self::Pricing(_), Locale::En) => "The total could not be calculated.",
            (Self::Pricing(_), Locale::Vi) => "Không thể tính tổng tiền.",
        };

        message.to_string()
    }
}
