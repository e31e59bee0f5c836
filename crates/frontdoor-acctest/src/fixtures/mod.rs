pub mod rule;
pub mod secret;

/// One rendered configuration: the HCL a practitioner would write and the
/// resource it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture<Id, Model> {
    pub config: String,
    pub id: Id,
    pub model: Model,
}
