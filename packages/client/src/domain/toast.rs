//! Transient user-facing notifications.

/// Identity of a toast inside its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Danger,
}

impl ToastKind {
    /// Style class attached to the toast
    pub fn class_name(&self) -> &'static str {
        match self {
            ToastKind::Success => "bg-success text-light",
            ToastKind::Danger => "bg-danger text-light",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub body: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }
}

/// Append-only toast list; removal is by identity.
///
/// No expiry: whoever renders the toasts decides when to remove them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, body: impl Into<String>, kind: ToastKind) -> Toast {
        let toast = Toast {
            id: ToastId(self.next_id),
            body: body.into(),
            kind,
        };
        self.next_id += 1;
        self.toasts.push(toast.clone());
        toast
    }

    /// Remove the toast with the given id. Returns whether it was present.
    pub fn remove(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}
