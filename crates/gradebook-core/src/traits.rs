//! Collaborator traits implemented by the view layer.

/// Asks the user to approve a destructive action.
///
/// The store never removes a semester without a `true` answer.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Approves every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Declines every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}
