//! The phase pipeline: parse, syntax tree passes, lowering, classification
//! and IR passes.

use crate::config::RazorConfiguration;
use crate::document::RazorCodeDocument;
use crate::error::EngineError;
use crate::passes::{default_syntax_tree_passes, RazorSyntaxTreePass, SyntaxTreePassContext};
use camino::Utf8Path;
use log::{debug, trace};
use razor_ir::{
    classify, default_passes, lower, CodeGenerationOptions, DefaultDocumentClassifier, DocumentClassifier,
    IntermediateNodePass, PassContext,
};
use razor_parser::{
    parse, DirectiveDescriptor, RazorLanguageVersion, RazorParserFeatureFlags, RazorParserOptions,
    RazorSourceDocument, RazorSyntaxTree,
};
use razor_tag_helpers::TagHelperDescriptor;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fs;
use std::sync::Arc;

/// A configured pipeline. Cheap to share between threads; processing never
/// mutates the engine.
pub struct RazorEngine {
    parser_options: RazorParserOptions,
    code_generation_options: CodeGenerationOptions,
    tag_helpers: Vec<Arc<TagHelperDescriptor>>,
    syntax_tree_passes: Vec<Arc<dyn RazorSyntaxTreePass>>,
    ir_passes: Vec<Arc<dyn IntermediateNodePass>>,
    classifiers: Vec<Arc<dyn DocumentClassifier>>,
}

impl RazorEngine {
    pub fn builder() -> RazorEngineBuilder {
        RazorEngineBuilder::new()
    }

    pub fn from_configuration(config: &RazorConfiguration) -> Result<RazorEngine, EngineError> {
        RazorEngineBuilder::from_configuration(config)?.build()
    }

    pub fn parser_options(&self) -> &RazorParserOptions {
        &self.parser_options
    }

    pub fn code_generation_options(&self) -> &CodeGenerationOptions {
        &self.code_generation_options
    }

    pub fn tag_helpers(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.tag_helpers
    }

    /// Processes `source` with `imports` applied before it.
    pub fn process(&self, source: &RazorSourceDocument, imports: &[RazorSourceDocument]) -> RazorCodeDocument {
        let import_syntax_trees: Vec<RazorSyntaxTree> =
            imports.iter().map(|import| parse(import, &self.parser_options)).collect();

        let mut syntax_tree = parse(source, &self.parser_options);
        let mut context = SyntaxTreePassContext::new(&import_syntax_trees, &self.tag_helpers);
        for pass in &self.syntax_tree_passes {
            trace!("syntax tree pass {}", pass.name());
            syntax_tree = pass.execute(&mut context, &syntax_tree);
        }
        let tag_helper_context = context.tag_helper_context.take().unwrap_or_default();
        let import_diagnostics = std::mem::take(&mut context.import_diagnostics);

        let mut document_node = lower(&syntax_tree, &import_syntax_trees);
        let pass_context = PassContext {
            source,
            options: &self.code_generation_options,
        };
        let default_classifier = DefaultDocumentClassifier;
        let mut classifiers: Vec<&dyn DocumentClassifier> =
            self.classifiers.iter().map(|classifier| classifier.as_ref()).collect();
        classifiers.push(&default_classifier);
        classify(&pass_context, &classifiers, &mut document_node);

        for pass in &self.ir_passes {
            trace!("document pass {}", pass.name());
            pass.execute(&pass_context, &mut document_node);
        }

        let document = RazorCodeDocument {
            source: source.clone(),
            imports: imports.to_vec(),
            syntax_tree,
            import_syntax_trees,
            tag_helper_context,
            import_diagnostics,
            document_node,
        };
        debug!(
            "processed {} with {} diagnostic(s)",
            source.file_path().map_or("<anonymous>", |path| path.as_ref()),
            document.diagnostics().len()
        );
        document
    }

    /// Processes independent documents in parallel, sharing `imports`.
    /// Results are in the order of `sources`.
    pub fn process_many(
        &self,
        sources: &[RazorSourceDocument],
        imports: &[RazorSourceDocument],
    ) -> Vec<RazorCodeDocument> {
        sources.par_iter().map(|source| self.process(source, imports)).collect()
    }

    /// Reads `path` and processes it. The path is recorded on the source.
    pub fn process_file(
        &self,
        path: &Utf8Path,
        imports: &[RazorSourceDocument],
    ) -> Result<RazorCodeDocument, EngineError> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::ReadDocument {
            path: path.to_string(),
            source,
        })?;
        let source = RazorSourceDocument::new(text, Some(path.as_str()));
        Ok(self.process(&source, imports))
    }
}

impl std::fmt::Debug for RazorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let syntax_tree_passes: Vec<&str> = self.syntax_tree_passes.iter().map(|pass| pass.name()).collect();
        let ir_passes: Vec<&str> = self.ir_passes.iter().map(|pass| pass.name()).collect();
        f.debug_struct("RazorEngine")
            .field("parser_options", &self.parser_options)
            .field("code_generation_options", &self.code_generation_options)
            .field("tag_helpers", &self.tag_helpers.len())
            .field("syntax_tree_passes", &syntax_tree_passes)
            .field("ir_passes", &ir_passes)
            .finish_non_exhaustive()
    }
}

/// Collects the directives, tag helpers and passes of a [`RazorEngine`].
///
/// The default syntax tree passes and document passes are registered up
/// front; passes added later run in `order()` with ties in registration
/// order.
pub struct RazorEngineBuilder {
    parser_options: RazorParserOptions,
    code_generation_options: CodeGenerationOptions,
    directives: Vec<Arc<DirectiveDescriptor>>,
    tag_helpers: Vec<Arc<TagHelperDescriptor>>,
    syntax_tree_passes: Vec<Arc<dyn RazorSyntaxTreePass>>,
    ir_passes: Vec<Arc<dyn IntermediateNodePass>>,
    classifiers: Vec<Arc<dyn DocumentClassifier>>,
}

impl Default for RazorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RazorEngineBuilder {
    pub fn new() -> Self {
        Self {
            parser_options: RazorParserOptions::default(),
            code_generation_options: CodeGenerationOptions::default(),
            directives: Vec::new(),
            tag_helpers: Vec::new(),
            syntax_tree_passes: default_syntax_tree_passes(),
            ir_passes: default_passes(),
            classifiers: Vec::new(),
        }
    }

    pub fn from_configuration(config: &RazorConfiguration) -> Result<Self, EngineError> {
        Ok(Self::new()
            .parser_options(config.parser_options()?)
            .code_generation_options(config.code_generation_options()))
    }

    /// Replaces the parser options. Directives already in `options` are
    /// kept alongside those added with [`directive`](Self::directive).
    pub fn parser_options(mut self, options: RazorParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    pub fn language_version(mut self, version: RazorLanguageVersion) -> Self {
        self.parser_options.language_version = version;
        self.parser_options.feature_flags = RazorParserFeatureFlags::for_version(version);
        self
    }

    pub fn design_time(mut self, design_time: bool) -> Self {
        self.parser_options.design_time = design_time;
        self
    }

    pub fn code_generation_options(mut self, options: CodeGenerationOptions) -> Self {
        self.code_generation_options = options;
        self
    }

    pub fn directive(mut self, directive: impl Into<Arc<DirectiveDescriptor>>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn tag_helper(mut self, descriptor: impl Into<Arc<TagHelperDescriptor>>) -> Self {
        self.tag_helpers.push(descriptor.into());
        self
    }

    pub fn tag_helpers(mut self, descriptors: impl IntoIterator<Item = Arc<TagHelperDescriptor>>) -> Self {
        self.tag_helpers.extend(descriptors);
        self
    }

    pub fn syntax_tree_pass(mut self, pass: impl RazorSyntaxTreePass + 'static) -> Self {
        self.syntax_tree_passes.push(Arc::new(pass));
        self
    }

    pub fn ir_pass(mut self, pass: impl IntermediateNodePass + 'static) -> Self {
        self.ir_passes.push(Arc::new(pass));
        self
    }

    /// Classifiers are tried in registration order before the default one.
    pub fn classifier(mut self, classifier: impl DocumentClassifier + 'static) -> Self {
        self.classifiers.push(Arc::new(classifier));
        self
    }

    pub fn build(self) -> Result<RazorEngine, EngineError> {
        let Self {
            mut parser_options,
            code_generation_options,
            directives,
            tag_helpers,
            mut syntax_tree_passes,
            mut ir_passes,
            classifiers,
        } = self;

        parser_options.directives.extend(directives);
        let mut seen = FxHashSet::default();
        for directive in &parser_options.directives {
            if !seen.insert(directive.directive.clone()) {
                return Err(EngineError::DuplicateDirective(directive.directive.clone()));
            }
        }

        syntax_tree_passes.sort_by_key(|pass| pass.order());
        ir_passes.sort_by_key(|pass| pass.order());

        debug!(
            "engine built with {} directive(s), {} tag helper(s), {} syntax tree pass(es), {} document pass(es)",
            parser_options.directives.len(),
            tag_helpers.len(),
            syntax_tree_passes.len(),
            ir_passes.len()
        );
        Ok(RazorEngine {
            parser_options,
            code_generation_options,
            tag_helpers,
            syntax_tree_passes,
            ir_passes,
            classifiers,
        })
    }
}
