//! Document classification: giving a flat document its
//! namespace / class / method skeleton.

use crate::naming::class_name_from_path;
use crate::node::{AnnotationKey, IntermediateNode, NodeKind};
use crate::passes::PassContext;
use log::debug;
use smol_str::SmolStr;

pub const DEFAULT_DOCUMENT_KIND: &str = "default";

/// The skeleton a classifier produces. Classifiers start from the values
/// derived from the options and adjust what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSkeleton {
    pub namespace: SmolStr,
    pub class_modifiers: Vec<SmolStr>,
    pub class_name: SmolStr,
    pub base_type: Option<SmolStr>,
    pub method_modifiers: Vec<SmolStr>,
    pub method_name: SmolStr,
    pub return_type: SmolStr,
}

impl DocumentSkeleton {
    pub fn from_context(context: &PassContext<'_>) -> Self {
        let options = context.options;
        let class_name = options.class_name.clone().unwrap_or_else(|| {
            class_name_from_path(context.source.file_path().map(|path| path.as_ref()))
        });
        Self {
            namespace: options.root_namespace.clone(),
            class_modifiers: vec![SmolStr::new_static("public")],
            class_name,
            base_type: options.base_type.clone(),
            method_modifiers: vec![
                SmolStr::new_static("public"),
                SmolStr::new_static("async"),
                SmolStr::new_static("override"),
            ],
            method_name: options.method_name.clone(),
            return_type: options.method_return_type.clone(),
        }
    }
}

pub trait DocumentClassifier: Send + Sync {
    /// Recorded on the document once this classifier claims it.
    fn document_kind(&self) -> &str;

    fn is_match(&self, context: &PassContext<'_>, document: &IntermediateNode) -> bool;

    fn configure(&self, _context: &PassContext<'_>, _skeleton: &mut DocumentSkeleton) {}
}

/// Accepts every document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDocumentClassifier;

impl DocumentClassifier for DefaultDocumentClassifier {
    fn document_kind(&self) -> &str {
        DEFAULT_DOCUMENT_KIND
    }

    fn is_match(&self, _context: &PassContext<'_>, _document: &IntermediateNode) -> bool {
        true
    }
}

/// Runs the first classifier that accepts `document`.
///
/// Returns the document kind, or `None` when no classifier matched. A
/// document that already has a kind is left alone.
pub fn classify(
    context: &PassContext<'_>,
    classifiers: &[&dyn DocumentClassifier],
    document: &mut IntermediateNode,
) -> Option<SmolStr> {
    if let Some(kind) = document.document_kind() {
        return Some(SmolStr::from(kind));
    }
    let classifier = classifiers
        .iter()
        .find(|classifier| classifier.is_match(context, document))?;

    let mut skeleton = DocumentSkeleton::from_context(context);
    classifier.configure(context, &mut skeleton);
    restructure(document, skeleton);

    let kind = SmolStr::from(classifier.document_kind());
    if let NodeKind::Document { document_kind } = &mut document.kind {
        *document_kind = Some(kind.clone());
    }
    debug!("classified document as {kind}");
    Some(kind)
}

/// Moves the flat children of `document` into the skeleton.
///
/// The checksum goes first and the usings follow it in their original
/// order. Tag helper fields open the class, other members follow them, and
/// everything else becomes the method body.
fn restructure(document: &mut IntermediateNode, skeleton: DocumentSkeleton) {
    let mut checksums = Vec::new();
    let mut usings = Vec::new();
    let mut tag_helper_fields = Vec::new();
    let mut members = Vec::new();
    let mut body = Vec::new();

    for child in std::mem::take(&mut document.children) {
        if matches!(child.kind, NodeKind::Checksum { .. }) {
            checksums.push(child);
        } else if matches!(child.kind, NodeKind::UsingDirective { .. }) {
            usings.push(child);
        } else if child.has_annotation(AnnotationKey::TagHelperField) {
            tag_helper_fields.push(child);
        } else if child.kind.is_member() {
            members.push(child);
        } else {
            body.push(child);
        }
    }

    let method = IntermediateNode::new(NodeKind::MethodDeclaration {
        modifiers: skeleton.method_modifiers,
        method_name: skeleton.method_name.clone(),
        return_type: skeleton.return_type,
    })
    .with_annotation(AnnotationKey::PrimaryMethod, skeleton.method_name)
    .with_children(body);

    let mut class_children = tag_helper_fields;
    class_children.extend(members);
    class_children.push(method);
    let class = IntermediateNode::new(NodeKind::ClassDeclaration {
        modifiers: skeleton.class_modifiers,
        class_name: skeleton.class_name.clone(),
        base_type: skeleton.base_type,
    })
    .with_annotation(AnnotationKey::PrimaryClass, skeleton.class_name)
    .with_children(class_children);

    let namespace = IntermediateNode::new(NodeKind::NamespaceDeclaration {
        content: skeleton.namespace.clone(),
    })
    .with_annotation(AnnotationKey::PrimaryNamespace, skeleton.namespace)
    .with_children(vec![class]);

    let mut children = checksums;
    children.extend(usings);
    children.push(namespace);
    document.children = children;
}
