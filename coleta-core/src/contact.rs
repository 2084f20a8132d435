//! Data for contacting a collection point through an external launcher.

use reqwest::Url;

use crate::model::{CollectionPoint, PointId};

/// Message prefilled in WhatsApp.
pub const WHATSAPP_TEXT: &str = "Tenho interesse sobre coleta de resíduos";
/// Subject prefilled in the mail client.
pub const MAIL_SUBJECT: &str = "Interesse na coleta de resíduos";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Contact action that cannot be built for a point.
pub enum ContactError {
    /// The point has no usable WhatsApp number.
    #[error("Point {0} has no WhatsApp number")]
    MissingNumber(PointId),
    /// The point has no mail address.
    #[error("Point {0} has no e-mail address")]
    MissingEmail(PointId),
    /// The link could not be assembled.
    #[error("Malformed contact link: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the point is contacted.
pub enum ContactChannel {
    /// WhatsApp chat.
    WhatsApp,
    /// E-mail.
    Mail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything a launcher needs to open a conversation with a point.
pub struct ContactAction {
    /// Channel to open.
    pub channel: ContactChannel,
    /// Recipient: digits-only phone number or mail address.
    pub recipient: String,
    /// Deep link handed to the platform.
    pub link: Url,
}

impl ContactAction {
    /// WhatsApp link with a prefilled message.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingNumber`] when the number has no digits.
    pub fn whatsapp(point: &CollectionPoint) -> Result<Self, ContactError> {
        let number: String = point
            .whatsapp_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if number.is_empty() {
            return Err(ContactError::MissingNumber(point.id));
        }

        let link = Url::parse_with_params(
            "whatsapp://send",
            &[("phone", number.as_str()), ("text", WHATSAPP_TEXT)],
        )
        .map_err(|err| ContactError::Malformed(err.to_string()))?;

        Ok(Self {
            channel: ContactChannel::WhatsApp,
            recipient: number,
            link,
        })
    }

    /// `mailto:` link with a prefilled subject.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingEmail`] when the address is blank.
    pub fn mail(point: &CollectionPoint) -> Result<Self, ContactError> {
        let recipient = point.email.trim();
        if recipient.is_empty() {
            return Err(ContactError::MissingEmail(point.id));
        }

        let mut link = Url::parse(&format!("mailto:{recipient}"))
            .map_err(|err| ContactError::Malformed(err.to_string()))?;
        link.query_pairs_mut().append_pair("subject", MAIL_SUBJECT);

        Ok(Self {
            channel: ContactChannel::Mail,
            recipient: recipient.to_owned(),
            link,
        })
    }
}
