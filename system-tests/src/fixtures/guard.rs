// system-tests/src/fixtures/guard.rs
// ============================================================================
// Module: Teardown Guard
// Description: Ordered, guaranteed release of remote resources.
// Purpose: Run deletion steps on every exit path, including panics.
// Dependencies: seatable-harness
// ============================================================================

//! ## Overview
//! [`Teardown`] is a stack of deletion steps. Steps run last-in first-out
//! when the guard is released or dropped. Every step runs even when an
//! earlier one fails, and every outcome is written to the audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use seatable_harness::audit::FixturePhase;

use super::FixtureError;
use super::context::Harness;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Deferred deletion callback.
type TeardownAction<'h> = Box<dyn FnOnce(&Harness) -> Result<(), FixtureError> + 'h>;

/// One registered deletion.
struct TeardownStep<'h> {
    /// Resource kind.
    resource: &'static str,
    /// Remote identifier for the audit trail.
    id: String,
    /// Deletion callback.
    action: TeardownAction<'h>,
}

/// Scoped teardown stack bound to a harness.
pub struct Teardown<'h> {
    /// Harness used to run the steps.
    harness: &'h Harness,
    /// Registered steps in creation order.
    steps: Vec<TeardownStep<'h>>,
}

// ============================================================================
// SECTION: Implementation
// ============================================================================

impl<'h> Teardown<'h> {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new(harness: &'h Harness) -> Self {
        Self {
            harness,
            steps: Vec::new(),
        }
    }

    /// Returns the bound harness.
    #[must_use]
    pub const fn harness(&self) -> &'h Harness {
        self.harness
    }

    /// Records that `resource` was created and registers its deletion.
    pub fn track(
        &mut self,
        resource: &'static str,
        id: impl Into<String>,
        action: impl FnOnce(&Harness) -> Result<(), FixtureError> + 'h,
    ) {
        let id = id.into();
        self.harness.record_fixture(resource, Some(&id), FixturePhase::Setup, None);
        self.defer(resource, id, action);
    }

    /// Registers a deletion for a resource the test itself will create.
    pub fn defer(
        &mut self,
        resource: &'static str,
        id: impl Into<String>,
        action: impl FnOnce(&Harness) -> Result<(), FixtureError> + 'h,
    ) {
        self.steps.push(TeardownStep {
            resource,
            id: id.into(),
            action: Box::new(action),
        });
    }

    /// Returns the number of pending steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when no step is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every pending step now.
    ///
    /// # Errors
    ///
    /// Returns the first [`FixtureError::Teardown`]; later steps still run.
    pub fn release(mut self) -> Result<(), FixtureError> {
        self.run()
    }

    /// Pops and runs steps until the stack is empty.
    fn run(&mut self) -> Result<(), FixtureError> {
        let mut first_error = None;
        while let Some(step) = self.steps.pop() {
            let result = (step.action)(self.harness).map_err(|err| FixtureError::Teardown {
                resource: step.resource.to_string(),
                message: format!("{}: {}", step.id, err.message()),
            });
            self.harness.record_fixture(step.resource, Some(&step.id), FixturePhase::Teardown, result.as_ref().err());
            if let Err(err) = result
                && first_error.is_none()
            {
                first_error = Some(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        // Failures are already on the audit sink.
        let _ = self.run();
    }
}

/// Records a failed setup step and passes the error through.
pub(crate) fn setup_failed(harness: &Harness, resource: &str, err: FixtureError) -> FixtureError {
    harness.record_fixture(resource, None, FixturePhase::Setup, Some(&err));
    err
}
