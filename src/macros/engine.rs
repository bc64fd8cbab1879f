//! Macro registry and substitution pass
//!
//! The scanner walks the query left to right looking for [`MACRO_MARKER`].
//! Each marker is followed by an identifier which is consumed maximally, so
//! `$__fromTimeX` never matches `fromTime`. A registered macro may take an
//! argument list that starts *immediately* after the name and ends at the
//! first `)`; arguments are comma separated and trimmed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{map, recognize},
    sequence::{delimited, pair},
    IResult,
};

use super::context::QueryContext;
use super::error::{MacroError, MacroResult};
use super::handlers;

/// Prefix that introduces a macro token
pub const MACRO_MARKER: &str = "$__";

/// Expands one macro invocation into literal query text
pub trait MacroHandler: Send + Sync {
    /// Produce the replacement text for an invocation with `args`
    fn expand(&self, ctx: &QueryContext, args: &[String]) -> MacroResult<String>;
}

impl<F> MacroHandler for F
where
    F: Fn(&QueryContext, &[String]) -> MacroResult<String> + Send + Sync,
{
    fn expand(&self, ctx: &QueryContext, args: &[String]) -> MacroResult<String> {
        self(ctx, args)
    }
}

/// Immutable table of named macro handlers
///
/// Built once through [`MacroRegistryBuilder`] and only read afterwards, so a
/// registry can be shared between threads without locking.
#[derive(Clone)]
pub struct MacroRegistry {
    handlers: HashMap<String, Arc<dyn MacroHandler>>,
}

impl MacroRegistry {
    /// Start building a registry
    pub fn builder() -> MacroRegistryBuilder {
        MacroRegistryBuilder::default()
    }

    /// Registry with the built-in QuestDB macros
    pub fn standard() -> Self {
        let mut table: HashMap<String, Arc<dyn MacroHandler>> = HashMap::new();
        table.insert("fromTime".to_string(), Arc::new(handlers::from_time));
        table.insert("toTime".to_string(), Arc::new(handlers::to_time));
        table.insert("timeFilter".to_string(), Arc::new(handlers::time_filter));
        table.insert(
            "sampleByInterval".to_string(),
            Arc::new(handlers::sample_by_interval),
        );
        Self { handlers: table }
    }

    /// Look up a handler by exact name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MacroHandler>> {
        self.handlers.get(name)
    }

    /// Check whether a macro name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered macro names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Replace every registered macro in `raw` with its expansion
    ///
    /// Text outside matched macro spans is copied unchanged. The first
    /// handler error aborts the whole pass.
    pub fn resolve(&self, raw: &str, ctx: &QueryContext) -> MacroResult<String> {
        let mut resolved = String::with_capacity(raw.len());
        let mut rest = raw;
        let mut expanded = 0usize;

        while let Some(pos) = rest.find(MACRO_MARKER) {
            resolved.push_str(&rest[..pos]);
            let after_marker = &rest[pos + MACRO_MARKER.len()..];

            let Ok((after_name, name)) = macro_name(after_marker) else {
                resolved.push_str(MACRO_MARKER);
                rest = after_marker;
                continue;
            };

            let Some(handler) = self.handlers.get(name) else {
                resolved.push_str(MACRO_MARKER);
                resolved.push_str(name);
                rest = after_name;
                continue;
            };

            let (remaining, args) = if after_name.starts_with('(') {
                argument_list(after_name)
                    .map_err(|_| MacroError::UnterminatedArguments(name.to_string()))?
            } else {
                (after_name, Vec::new())
            };

            let expansion = handler.expand(ctx, &args)?;
            tracing::trace!(macro_name = name, ?args, %expansion, "Expanded macro");

            resolved.push_str(&expansion);
            rest = remaining;
            expanded += 1;
        }

        resolved.push_str(rest);
        tracing::debug!(expanded, "Resolved query macros");
        Ok(resolved)
    }
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.names())
            .finish()
    }
}

/// Builder for [`MacroRegistry`]
#[derive(Default)]
pub struct MacroRegistryBuilder {
    handlers: HashMap<String, Arc<dyn MacroHandler>>,
}

impl MacroRegistryBuilder {
    /// Seed the builder with the built-in macros
    ///
    /// Fails if a built-in name was already registered.
    pub fn with_standard_macros(self) -> MacroResult<Self> {
        MacroRegistry::standard()
            .handlers
            .into_iter()
            .try_fold(self, |builder, (name, handler)| {
                builder.register_shared(name, handler)
            })
    }

    /// Register a handler under `name`
    ///
    /// Registering the same name twice is an error rather than a silent
    /// override.
    pub fn register(
        mut self,
        name: impl Into<String>,
        handler: impl MacroHandler + 'static,
    ) -> MacroResult<Self> {
        self.register_shared(name.into(), Arc::new(handler))
    }

    fn register_shared(
        mut self,
        name: String,
        handler: Arc<dyn MacroHandler>,
    ) -> MacroResult<Self> {
        if self.handlers.contains_key(&name) {
            return Err(MacroError::DuplicateMacro(name));
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> MacroRegistry {
        MacroRegistry {
            handlers: self.handlers,
        }
    }
}

/// Parse a macro identifier like `timeFilter`
fn macro_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Parse an argument list like `( tstmp, 5 )`
fn argument_list(input: &str) -> IResult<&str, Vec<String>> {
    map(
        delimited(char('('), take_while(|c: char| c != ')'), char(')')),
        split_arguments,
    )(input)
}

fn split_arguments(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|arg| arg.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;
    use chrono::Duration;

    fn context() -> QueryContext {
        let range =
            TimeRange::parse_rfc3339("2024-01-20T12:34:56.789Z", "2024-02-10T10:01:02.123Z")
                .unwrap();
        QueryContext::new(range)
    }

    #[test]
    fn test_macro_name_is_maximal() {
        assert_eq!(macro_name("fromTime "), Ok((" ", "fromTime")));
        assert_eq!(macro_name("fromTimeX"), Ok(("", "fromTimeX")));
        assert!(macro_name("(x)").is_err());
    }

    #[test]
    fn test_argument_list() {
        assert_eq!(
            argument_list("( tstmp ) rest"),
            Ok((" rest", vec!["tstmp".to_string()]))
        );
        assert_eq!(
            argument_list("(a, b ,c)"),
            Ok(("", vec!["a".to_string(), "b".to_string(), "c".to_string()]))
        );
        assert_eq!(argument_list("()"), Ok(("", Vec::new())));
        assert_eq!(argument_list("(  )"), Ok(("", Vec::new())));
        assert!(argument_list("(tstmp").is_err());
    }

    #[test]
    fn test_resolve_bare_macros() {
        let registry = MacroRegistry::standard();
        let resolved = registry
            .resolve(
                "select * from tab where ( tstmp >= $__fromTime and tstmp <= $__toTime )",
                &context(),
            )
            .unwrap();
        assert_eq!(
            resolved,
            "select * from tab where ( tstmp >= cast(1705754096789000 as timestamp) and tstmp <= cast(1707559262123000 as timestamp) )"
        );
    }

    #[test]
    fn test_resolve_preserves_trailing_text() {
        let registry = MacroRegistry::standard();
        let resolved = registry
            .resolve("select * from tab where tstmp >= $__fromTime ", &context())
            .unwrap();
        assert_eq!(
            resolved,
            "select * from tab where tstmp >= cast(1705754096789000 as timestamp) "
        );
    }

    #[test]
    fn test_resolve_macro_with_arguments() {
        let registry = MacroRegistry::standard();
        let resolved = registry
            .resolve("select * from tab where $__timeFilter( tstmp )", &context())
            .unwrap();
        assert_eq!(
            resolved,
            "select * from tab where tstmp >= cast(1705754096789000 as timestamp) AND tstmp <= cast(1707559262123000 as timestamp)"
        );
    }

    #[test]
    fn test_resolve_sample_by_scenario() {
        let registry = MacroRegistry::standard();
        let ctx = context().with_interval(Duration::seconds(30));
        let resolved = registry
            .resolve(
                "select * from tab where $__timeFilter( tstmp ) sample by $__sampleByInterval",
                &ctx,
            )
            .unwrap();
        assert_eq!(
            resolved,
            "select * from tab where tstmp >= cast(1705754096789000 as timestamp) AND tstmp <= cast(1707559262123000 as timestamp) sample by 30s"
        );

        let ctx = context().with_interval(Duration::milliseconds(1));
        let resolved = registry
            .resolve("select * from tab sample by $__sampleByInterval", &ctx)
            .unwrap();
        assert_eq!(resolved, "select * from tab sample by 1T");
    }

    #[test]
    fn test_unknown_macros_left_verbatim() {
        let registry = MacroRegistry::standard();
        let raw = "select $__unknown(a), $__fromTimeX, '$__', $__ from tab";
        assert_eq!(registry.resolve(raw, &context()).unwrap(), raw);
    }

    #[test]
    fn test_argument_list_must_be_adjacent() {
        let registry = MacroRegistry::standard();
        let resolved = registry
            .resolve("select $__fromTime (1) from tab", &context())
            .unwrap();
        assert_eq!(
            resolved,
            "select cast(1705754096789000 as timestamp) (1) from tab"
        );
    }

    #[test]
    fn test_bad_argument_count_aborts() {
        let registry = MacroRegistry::standard();

        let err = registry
            .resolve("select $__fromTime where $__timeFilter()", &context())
            .unwrap_err();
        assert_eq!(
            err,
            MacroError::BadArgumentCount {
                macro_name: "timeFilter".to_string(),
                expected: 1,
                received: 0,
            }
        );

        let err = registry
            .resolve("where $__timeFilter", &context())
            .unwrap_err();
        assert!(matches!(err, MacroError::BadArgumentCount { received: 0, .. }));

        let err = registry
            .resolve("where $__timeFilter(a, b)", &context())
            .unwrap_err();
        assert!(matches!(err, MacroError::BadArgumentCount { received: 2, .. }));
    }

    #[test]
    fn test_unterminated_arguments() {
        let registry = MacroRegistry::standard();
        let err = registry
            .resolve("where $__timeFilter(tstmp", &context())
            .unwrap_err();
        assert_eq!(err, MacroError::UnterminatedArguments("timeFilter".to_string()));
    }

    #[test]
    fn test_expansions_are_not_rescanned() {
        let registry = MacroRegistry::builder()
            .register("echo", |_: &QueryContext, args: &[String]| -> MacroResult<String> {
                Ok(format!("$__{}", args.join("")))
            })
            .unwrap()
            .with_standard_macros()
            .unwrap()
            .build();

        let resolved = registry.resolve("$__echo(fromTime)", &context()).unwrap();
        assert_eq!(resolved, "$__fromTime");
    }

    #[test]
    fn test_custom_handler_error_propagates() {
        let registry = MacroRegistry::builder()
            .register("fail", |_: &QueryContext, _: &[String]| -> MacroResult<String> {
                Err(MacroError::Expansion {
                    macro_name: "fail".to_string(),
                    reason: "no table selected".to_string(),
                })
            })
            .unwrap()
            .build();

        let err = registry.resolve("select $__fail", &context()).unwrap_err();
        assert!(matches!(err, MacroError::Expansion { .. }));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let result = MacroRegistry::builder()
            .with_standard_macros()
            .unwrap()
            .register("fromTime", handlers::to_time);
        assert!(matches!(result, Err(MacroError::DuplicateMacro(name)) if name == "fromTime"));
    }

    #[test]
    fn test_standard_macros_do_not_override_custom() {
        let result = MacroRegistry::builder()
            .register("fromTime", |_: &QueryContext, _: &[String]| -> MacroResult<String> {
                Ok("CUSTOM".to_string())
            })
            .unwrap()
            .with_standard_macros();
        assert!(matches!(result, Err(MacroError::DuplicateMacro(name)) if name == "fromTime"));
    }

    #[test]
    fn test_standard_names() {
        let registry = MacroRegistry::standard();
        assert_eq!(
            registry.names(),
            vec!["fromTime", "sampleByInterval", "timeFilter", "toTime"]
        );
        assert!(registry.contains("timeFilter"));
        assert!(!registry.contains("timefilter"));
    }

    #[test]
    fn test_registry_shared_across_threads() {
        let registry = Arc::new(MacroRegistry::standard());

        std::thread::scope(|scope| {
            for seconds in 1..=4i64 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    let ctx = context().with_interval(Duration::seconds(seconds));
                    let resolved = registry.resolve("$__sampleByInterval", &ctx).unwrap();
                    assert_eq!(resolved, format!("{}s", seconds));
                });
            }
        });
    }
}
