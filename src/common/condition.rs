use crate::{common, patch::CompileError};

/// Condition requiring an attribute to be present on the stored item.
///
/// Used on updates so that a missing item is reported instead of silently created.
///
/// ```rust
/// use dynamodb_item_patch::common::condition;
///
/// let condition = condition::AttributeExists {
///     name: "itemId".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttributeExists {
    /// The attribute that must exist.
    pub name: String,
}

impl AttributeExists {
    /// Render the condition, allocating its name placeholder next to the ones already bound.
    pub(crate) fn get_expression(
        &self,
        placeholders: &mut common::NamePlaceholders,
    ) -> Result<String, CompileError> {
        let placeholder = placeholders.allocate(&self.name)?;
        Ok(format!("attribute_exists({placeholder})"))
    }
}
