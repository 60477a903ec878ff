//! Intrinsic template expansion.
//!
//! A call template is written in terms of the intrinsic declaration's own parameters:
//!
//! ```go
//! func (p *WebKitPoint) SetX(x float64) { js.Rewrite("$_.x = $1", x) }
//! ```
//!
//! At a call site `pt.SetX(5)`, the receiver `p` is bound to the rendered receiver and `x` to the rendered `5`. The
//! template arguments are then rendered under those bindings and substituted: `pt.x = 5`. Arguments are rendered
//! before substitution, so templates nest.

use std::collections::HashMap;

use golly_core::lang::js_keywords::escape_ident;
use golly_core::{Template, TemplateError};
use golly_syntax::ast::{FuncDecl, Pos};

use super::codegen::{Js, Prec};
use super::errors::EmitError;

/// Substitute rendered receiver and argument text into `template`.
pub(crate) fn render(
    id: &str,
    pos: &Pos,
    template: &Template,
    receiver: &str,
    args: &[String],
) -> Result<String, EmitError> {
    template.render(receiver, args).map_err(|err| match err {
        TemplateError::MissingArgument { index, supplied } => EmitError::TemplateArity {
            id: id.to_string(),
            pos: pos.clone(),
            index,
            supplied,
        },
    })
}

/// Bind the declaration's receiver and parameters to the text rendered at one call site.
///
/// A variadic tail parameter is bound to the remaining arguments joined with commas, so `console.log($1)` receives
/// them as separate arguments.
pub(crate) fn bind(decl: &FuncDecl, receiver: Option<Js>, args: Vec<Js>) -> HashMap<String, Js> {
    let mut bindings = HashMap::new();
    if let (Some(name), Some(receiver)) = (decl.recv.as_ref().and_then(|r| r.name.as_deref()), receiver) {
        bindings.insert(escape_ident(name), receiver);
    }

    let mut args = args.into_iter();
    let last = decl.params.len().saturating_sub(1);
    for (i, param) in decl.params.iter().enumerate() {
        let name = escape_ident(&param.name);
        if decl.variadic && i == last {
            let rest: Vec<String> = args.by_ref().map(|a| a.text).collect();
            bindings.insert(name, Js::new(rest.join(", "), Prec::Lowest));
            break;
        }
        match args.next() {
            Some(arg) => {
                bindings.insert(name, arg);
            }
            None => break,
        }
    }
    bindings
}
