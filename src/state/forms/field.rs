//! Form field value objects

/// How a field accepts and displays input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    /// Accepts ASCII digits only
    Digits,
    /// Rendered masked
    Secret,
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, Default)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Text)
    }

    /// Create a new numeric field
    pub fn digits(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Digits)
    }

    /// Create a new masked field
    pub fn secret(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Secret)
    }

    fn with_kind(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: String::new(),
            kind,
        }
    }

    pub fn as_text(&self) -> &str {
        &self.value
    }

    /// Value with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Push a character to the field value. Digit fields ignore anything else.
    pub fn push_char(&mut self, c: char) {
        match self.kind {
            FieldKind::Digits if !c.is_ascii_digit() => {}
            _ => self.value.push(c),
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_accepts_anything() {
        let mut field = FormField::text("name", "Name");
        for c in "Ada L.".chars() {
            field.push_char(c);
        }
        assert_eq!(field.as_text(), "Ada L.");
    }

    #[test]
    fn test_digit_field_rejects_non_digits() {
        let mut field = FormField::digits("age", "Age");
        for c in "3a6-".chars() {
            field.push_char(c);
        }
        assert_eq!(field.as_text(), "36");
    }

    #[test]
    fn test_secret_field_is_masked() {
        let mut field = FormField::secret("password", "Password");
        field.set_text("Secr3t!");
        assert_eq!(field.display_value(), "•••••••");
        assert_eq!(field.as_text(), "Secr3t!");
    }

    #[test]
    fn test_pop_and_clear() {
        let mut field = FormField::text("name", "Name");
        field.set_text("abc");
        field.pop_char();
        assert_eq!(field.as_text(), "ab");
        field.clear();
        assert!(field.is_blank());
    }

    #[test]
    fn test_blank_ignores_whitespace() {
        let mut field = FormField::text("name", "Name");
        field.set_text("   ");
        assert!(field.is_blank());
        assert_eq!(field.trimmed(), "");
    }
}
