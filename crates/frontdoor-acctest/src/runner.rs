use std::fmt::{Debug, Display};

use frontdoor_driver::{DriverError, ResourceLifecycle};
use tracing::{debug, info, warn};

use crate::data::TestData;
use crate::error::AccTestError;
use crate::fixtures::Fixture;

/// One step of an acceptance test.
#[derive(Debug, Clone)]
pub enum TestStep<Id, Model> {
    /// Bring the resource to the fixture's state and check that it exists.
    /// With `expect_error`, the step passes only if applying fails with an
    /// error containing that text.
    Apply {
        fixture: Fixture<Id, Model>,
        expect_error: Option<String>,
    },
    /// Read the resource back and compare it with the last applied state.
    Import,
    /// Declare the already-created resource again; creation must be refused.
    RequiresImportError { fixture: Fixture<Id, Model> },
}

impl<Id, Model> TestStep<Id, Model> {
    pub fn apply(fixture: Fixture<Id, Model>) -> Self {
        TestStep::Apply { fixture, expect_error: None }
    }

    pub fn expect_error(fixture: Fixture<Id, Model>, text: impl Into<String>) -> Self {
        TestStep::Apply { fixture, expect_error: Some(text.into()) }
    }
}

/// Drives [`TestStep`]s against any [`ResourceLifecycle`] and destroys what it
/// created once the steps finish, successfully or not.
pub struct ResourceTest<'a, L: ResourceLifecycle> {
    lifecycle: &'a L,
    data:      TestData,
}

impl<'a, L> ResourceTest<'a, L>
where
    L: ResourceLifecycle,
    L::Id: Clone + Display,
    L::Model: Clone + Debug + PartialEq,
{
    pub fn new(lifecycle: &'a L, data: TestData) -> Self {
        Self { lifecycle, data }
    }

    pub async fn run(&self, steps: Vec<TestStep<L::Id, L::Model>>) -> Result<(), AccTestError> {
        info!(resource = %self.data.resource_name, steps = steps.len(), "starting resource test");
        let mut applied: Option<(L::Id, L::Model)> = None;
        let mut created: Option<L::Id> = None;

        let mut outcome = Ok(());
        for (i, step) in steps.into_iter().enumerate() {
            let step_no = i + 1;
            if let Err(e) = self.run_step(step_no, step, &mut applied, &mut created).await {
                warn!(resource = %self.data.resource_name, step = step_no, error = %e, "step failed");
                outcome = Err(e);
                break;
            }
        }

        let destroyed = match created {
            Some(id) => self.destroy(&id).await,
            None => Ok(()),
        };
        outcome.and(destroyed)
    }

    async fn run_step(
        &self,
        step: usize,
        test_step: TestStep<L::Id, L::Model>,
        applied: &mut Option<(L::Id, L::Model)>,
        created: &mut Option<L::Id>,
    ) -> Result<(), AccTestError> {
        match test_step {
            TestStep::Apply { fixture, expect_error } => {
                debug!(step, id = %fixture.id, "apply");
                let result = self.apply(&fixture).await;
                match (result, expect_error) {
                    (Ok(()), None) => {
                        let found = self
                            .lifecycle
                            .exists(&fixture.id)
                            .await
                            .map_err(|source| AccTestError::Step { step, source })?;
                        if !found {
                            return Err(AccTestError::NotFoundAfterApply {
                                step,
                                id: fixture.id.to_string(),
                            });
                        }
                        *created = Some(fixture.id.clone());
                        *applied = Some((fixture.id, fixture.model));
                        Ok(())
                    }
                    (Ok(()), Some(expected)) => {
                        *created = Some(fixture.id);
                        Err(AccTestError::UnexpectedSuccess { step, expected })
                    }
                    (Err(source), None) => Err(AccTestError::Step { step, source }),
                    (Err(e), Some(expected)) => {
                        let actual = e.to_string();
                        if actual.contains(&expected) {
                            debug!(step, "apply failed as expected");
                            Ok(())
                        } else {
                            Err(AccTestError::WrongError { step, expected, actual })
                        }
                    }
                }
            }
            TestStep::Import => {
                let Some((id, model)) = applied.as_ref() else {
                    return Err(AccTestError::NothingToImport { step });
                };
                debug!(step, id = %id, "import");
                let imported = self
                    .lifecycle
                    .read(id)
                    .await
                    .map_err(|source| AccTestError::Step { step, source })?;
                match imported {
                    Some(m) if &m == model => Ok(()),
                    other => Err(AccTestError::ImportMismatch {
                        step,
                        id: id.to_string(),
                        applied: format!("{:?}", model),
                        imported: format!("{:?}", other),
                    }),
                }
            }
            TestStep::RequiresImportError { fixture } => {
                debug!(step, id = %fixture.id, "requires import");
                match self.lifecycle.create(&fixture.id, &fixture.model).await {
                    Err(DriverError::AlreadyExists { .. }) => Ok(()),
                    Err(source) => Err(AccTestError::Step { step, source }),
                    Ok(_) => Err(AccTestError::UnexpectedSuccess {
                        step,
                        expected: "already exists".into(),
                    }),
                }
            }
        }
    }

    /// Validate, then create when absent or update otherwise.
    async fn apply(&self, fixture: &Fixture<L::Id, L::Model>) -> Result<(), DriverError> {
        self.lifecycle.validate(&fixture.model)?;
        if self.lifecycle.exists(&fixture.id).await? {
            self.lifecycle.update(&fixture.id, &fixture.model).await?;
        } else {
            self.lifecycle.create(&fixture.id, &fixture.model).await?;
        }
        Ok(())
    }

    async fn destroy(&self, id: &L::Id) -> Result<(), AccTestError> {
        debug!(id = %id, "destroy");
        self.lifecycle
            .delete(id)
            .await
            .map_err(|source| AccTestError::Destroy { id: id.to_string(), source })?;
        let still_there = self
            .lifecycle
            .exists(id)
            .await
            .map_err(|source| AccTestError::Destroy { id: id.to_string(), source })?;
        if still_there {
            return Err(AccTestError::NotDestroyed { id: id.to_string() });
        }
        info!(resource = %self.data.resource_name, id = %id, "destroyed");
        Ok(())
    }
}
