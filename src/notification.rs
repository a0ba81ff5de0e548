//! Decode notification / diagnostic log.
//!
//! Non-fatal issues encountered while decoding are collected as
//! `Notification` items rather than being silently dropped or causing hard
//! errors. Each notification carries the stream path, byte offset and type
//! id that triggered it, and is mirrored to `tracing` when recorded.
//!
//! After a read the caller can inspect [`DecodedModel::notifications`] to
//! see what was encountered.
//!
//! [`DecodedModel::notifications`]: crate::model::DecodedModel::notifications

use std::fmt;

use crate::error::InvError;
use crate::types::TypeId;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// A record type or stream layout is not yet implemented.
    NotImplemented,
    /// Non-fatal warning (e.g., dangling reference, attribute rebind).
    Warning,
    /// Error that failed a record or a segment.
    Error,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single notification produced during decoding.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The severity / category.
    pub notification_type: NotificationType,
    /// Error kind name (`TruncatedInput`, `DanglingReference`, ...), if any.
    pub kind: Option<&'static str>,
    /// A human-readable description of the issue.
    pub message: String,
    /// Stream the issue was found in.
    pub stream: Option<String>,
    /// Byte offset within the decompressed segment buffer.
    pub offset: Option<usize>,
    /// Type id of the record being decoded.
    pub type_id: Option<TypeId>,
}

impl Notification {
    /// Create a new notification.
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            kind: None,
            message: message.into(),
            stream: None,
            offset: None,
            type_id: None,
        }
    }

    /// Create a notification from a decoder error.
    pub fn from_error(notification_type: NotificationType, error: &InvError) -> Self {
        Self {
            kind: Some(error.kind_name()),
            ..Self::new(notification_type, error.to_string())
        }
    }

    /// Attach the stream path.
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attach the byte offset.
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach the record type id.
    pub fn for_type(mut self, type_id: TypeId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    fn trace(&self) {
        match self.notification_type {
            NotificationType::Error => tracing::error!(
                stream = self.stream.as_deref().unwrap_or(""),
                offset = self.offset,
                type_id = %self.type_id.unwrap_or_default(),
                "{}",
                self.message
            ),
            NotificationType::Warning => tracing::warn!(
                stream = self.stream.as_deref().unwrap_or(""),
                offset = self.offset,
                type_id = %self.type_id.unwrap_or_default(),
                "{}",
                self.message
            ),
            NotificationType::NotImplemented => tracing::debug!(
                stream = self.stream.as_deref().unwrap_or(""),
                "{}",
                self.message
            ),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.notification_type, self.message)?;
        if let Some(stream) = &self.stream {
            write!(f, " (stream {}", stream)?;
            if let Some(offset) = self.offset {
                write!(f, " @ {:#X}", offset)?;
            }
            if let Some(type_id) = &self.type_id {
                write!(f, ", type {}", type_id)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Collects notifications during a read operation.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.push(Notification::new(notification_type, message));
    }

    /// Record a fully populated notification.
    pub fn push(&mut self, notification: Notification) {
        notification.trace();
        self.items.push(notification);
    }

    /// Move every notification of `other` into this collection.
    ///
    /// The moved items were already traced when first recorded.
    pub fn append(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Get all notifications raised for a given error kind.
    pub fn of_kind(&self, kind: &str) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.kind == Some(kind)).collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Consume the collection into a `Vec`.
    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
