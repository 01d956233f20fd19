//! Name resolution, type inference and the editor features built on them.

mod folding;
mod infer;
mod navigation;
mod references;
mod scope;
mod semantics;
mod symbols;
mod ty;

pub use folding::{Fold, FoldKind, folding_ranges};
pub use navigation::{HoverResult, goto_definition, hover, pick_best_token, token_at_cursor};
pub use references::{Reference, find_references, find_usages};
pub use scope::{Declaration, DeclarationKind};
pub use semantics::Semantics;
pub use symbols::{DocumentSymbol, document_symbols};
pub use ty::{FunctionTy, Member, ObjectTy, Ty};
use verdant_errors::Diagnostic;
use verdant_inputs::File;
use verdant_parse::FileParse as _;
use verdant_yellow::ast::AstNode as _;

/// Syntax diagnostics followed by name resolution warnings, ordered by
/// position.
#[salsa::tracked(returns(ref), no_eq)]
pub fn check_file(db: &dyn salsa::Database, file: File) -> Vec<Diagnostic> {
    let tree = file.syntax_tree(db);
    let sema = Semantics::new(tree);

    let mut diagnostics = file.parse(db).diagnostics().to_owned();
    diagnostics.extend(semantic_diagnostics(&sema));
    diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());
    diagnostics
}

/// Warnings for names that resolve to nothing.
pub fn semantic_diagnostics<'a>(sema: &'a Semantics<'a>) -> impl Iterator<Item = Diagnostic> + 'a {
    sema.unresolved_names().map(|name_ref| {
        Diagnostic::warning(format!("unresolved name `{}`", name_ref.text()), name_ref.range())
    })
}
