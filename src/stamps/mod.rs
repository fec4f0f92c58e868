//! Stamp QR payload.
//!
//! A collection point scans the user's QR code to award a stamp. The code
//! encodes nothing but the account's user id.

use crate::api::UserInfo;

/// Payload used when no user id could be loaded.
pub const MISSING_USER_ID: &str = "No User ID";

/// Prompt shown above the code.
pub const SCAN_PROMPT: &str = "Scan the QR code below to earn stamp:";

/// The string to encode in the stamp QR code.
pub fn stamp_payload(info: Option<&UserInfo>) -> String {
    info.map(|i| i.user_id.trim())
        .filter(|id| !id.is_empty())
        .unwrap_or(MISSING_USER_ID)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_user_id() {
        let info = UserInfo {
            user_id: "u-501".to_string(),
        };
        assert_eq!(stamp_payload(Some(&info)), "u-501");
    }

    #[test]
    fn missing_or_blank_id_uses_placeholder() {
        assert_eq!(stamp_payload(None), "No User ID");
        let blank = UserInfo {
            user_id: "  ".to_string(),
        };
        assert_eq!(stamp_payload(Some(&blank)), "No User ID");
    }
}
