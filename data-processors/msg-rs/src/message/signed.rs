use super::{Attachment, BaseMessage, HeaderBlock, Message, MessageKind, plain_header_block};
use once_cell::sync::OnceCell;

const SIGNED_MIME_TYPES: [&str; 3] = [
    "multipart/signed",
    "application/pkcs7-mime",
    "application/x-pkcs7-mime",
];

#[derive(Debug)]
/// An S/MIME message
///
/// The signed content is kept, undecoded, in one of the attachments
pub struct Signed {
    base: BaseMessage,
    header: OnceCell<HeaderBlock>,
}

impl Signed {
    pub(crate) fn new(base: BaseMessage) -> Self {
        Self {
            base,
            header: OnceCell::new(),
        }
    }

    /// The attachment holding the signed content
    pub fn signed_attachment(&self) -> Option<&Attachment> {
        let attachments = self.attachments();
        attachments
            .iter()
            .find(|a| {
                a.mime_type()
                    .is_some_and(|m| SIGNED_MIME_TYPES.iter().any(|t| m.eq_ignore_ascii_case(t)))
            })
            .or_else(|| {
                // Opaque signatures
                attachments.iter().find(|a| {
                    a.name().is_some_and(|n| {
                        let n = n.to_ascii_lowercase();
                        n.ends_with(".p7m") || n.ends_with(".p7s")
                    })
                })
            })
    }

    /// The raw signed content (MIME or PKCS#7)
    pub fn signed_data(&self) -> Option<&[u8]> {
        self.signed_attachment()?.data()
    }
}

impl Message for Signed {
    fn base(&self) -> &BaseMessage {
        &self.base
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Signed
    }

    fn header_block(&self) -> &HeaderBlock {
        self.header.get_or_init(|| plain_header_block(self))
    }
}
