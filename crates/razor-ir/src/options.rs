use smol_str::SmolStr;

/// Names used when a document is given its class skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerationOptions {
    pub root_namespace: SmolStr,
    /// Derived from the document path when `None`.
    pub class_name: Option<SmolStr>,
    /// Replaced by the last `@inherits` when present.
    pub base_type: Option<SmolStr>,
    pub method_name: SmolStr,
    pub method_return_type: SmolStr,
}

impl Default for CodeGenerationOptions {
    fn default() -> Self {
        Self {
            root_namespace: SmolStr::new_static("Razor"),
            class_name: None,
            base_type: None,
            method_name: SmolStr::new_static("ExecuteAsync"),
            method_return_type: SmolStr::new_static("global::System.Threading.Tasks.Task"),
        }
    }
}

impl CodeGenerationOptions {
    pub fn with_root_namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.root_namespace = namespace.into();
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<SmolStr>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_base_type(mut self, base_type: impl Into<SmolStr>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }
}
