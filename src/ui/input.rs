//! Form input decoration.
//!
//! Three layers, each wrapping the previous one:
//! - [`Input`]: disabled state and the trailing loading / success indicator
//! - [`AppInput`]: invalid styling plus a collapsible error message
//! - [`FormikInput`]: derives the above from a validated form field

/// Trailing icon inside an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Loading,
    Success,
}

impl Indicator {
    /// Accessible label of the icon.
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Success => "Success",
        }
    }
}

/// A plain text input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    pub value: String,
    pub disabled: bool,
    pub loading: bool,
    pub success: bool,
    /// Reserve indicator room without showing one.
    pub padded: bool,
}

impl Input {
    /// Loading inputs are disabled too.
    pub fn is_disabled(&self) -> bool {
        self.loading || self.disabled
    }

    /// Loading wins over success.
    pub fn indicator(&self) -> Option<Indicator> {
        if self.loading {
            Some(Indicator::Loading)
        } else if self.success {
            Some(Indicator::Success)
        } else {
            None
        }
    }

    /// Room is reserved for the indicator whenever one may show.
    pub fn has_trailing_padding(&self) -> bool {
        self.loading || self.success || self.padded
    }
}

/// An [`Input`] with an error message that folds in and out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInput {
    pub input: Input,
    error: bool,
    error_message: Option<String>,
    open: bool,
}

impl AppInput {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    /// Set the error flag. The message panel opens or closes to match.
    pub fn set_error(&mut self, error: bool, message: Option<String>) {
        if error != self.error {
            self.open = error;
        }
        self.error = error;
        self.error_message = message;
    }

    /// Open or close the message panel by hand.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_invalid(&self) -> bool {
        self.error
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Validation state of a form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    pub value: String,
    pub touched: bool,
    pub error: Option<String>,
}

type ChangeHook = Box<dyn FnMut(&str) + Send>;

/// An [`AppInput`] bound to a form field.
pub struct FormikInput {
    pub name: String,
    /// Show errors before the user has touched the field.
    pub validate_before_touch: bool,
    field: FieldMeta,
    on_change: Option<ChangeHook>,
    app: AppInput,
}

impl FormikInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validate_before_touch: false,
            field: FieldMeta::default(),
            on_change: None,
            app: AppInput::default(),
        }
    }

    pub fn validate_before_touch(mut self, enabled: bool) -> Self {
        self.validate_before_touch = enabled;
        self.sync();
        self
    }

    /// Hook run on every change, before the field is updated.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn field(&self) -> &FieldMeta {
        &self.field
    }

    pub fn has_error(&self) -> bool {
        self.shows_errors() && self.field.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        if self.shows_errors() {
            self.field.error.as_deref()
        } else {
            None
        }
    }

    pub fn is_success(&self) -> bool {
        self.field.touched && self.field.error.is_none() && !self.field.value.is_empty()
    }

    pub fn handle_change(&mut self, value: &str) {
        if let Some(hook) = self.on_change.as_mut() {
            hook(value);
        }
        self.field.value = value.to_string();
        self.sync();
    }

    pub fn touch(&mut self) {
        self.field.touched = true;
        self.sync();
    }

    /// Result of validating the field.
    pub fn set_error(&mut self, error: Option<String>) {
        self.field.error = error;
        self.sync();
    }

    /// The decorated input as it should render now.
    pub fn app_input(&self) -> &AppInput {
        &self.app
    }

    pub fn toggle_message(&mut self) {
        self.app.toggle();
    }

    fn shows_errors(&self) -> bool {
        self.validate_before_touch || self.field.touched
    }

    fn sync(&mut self) {
        let has_error = self.has_error();
        let message = self.error_message().map(str::to_string);
        self.app.input.value = self.field.value.clone();
        // A valid field only makes room on the right; no check icon.
        self.app.input.padded = self.is_success();
        self.app.set_error(has_error, message);
    }
}

impl std::fmt::Debug for FormikInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormikInput")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("validate_before_touch", &self.validate_before_touch)
            .finish_non_exhaustive()
    }
}
