//! Invocation helper — `call` for `"class@method"` targets and ad-hoc
//! callables with declared parameter lists.
//!
//! Mirrors the container's constructor auto-wiring at the call site: each
//! declared parameter is filled from a matching named argument, a built
//! class-typed dependency, or a declared default, in that order. A
//! parameter with none of those fails with `MissingArgument` instead of
//! silently shifting the argument list.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::binding::{Object, object};
use crate::container::Container;
use crate::error::{
    ContainerError, InvalidArgumentError, MissingArgumentError, Result,
};
use crate::key::BindingKey;

/// Produces a default value for an unfilled parameter.
pub type DefaultFn = Arc<dyn Fn() -> Object + Send + Sync>;

/// Runs an ad-hoc callable over an assembled argument list.
pub type CallableFn = Arc<dyn Fn(&mut crate::blueprint::Args) -> Result<Object> + Send + Sync>;

/// Caller-supplied arguments for [`Container::call`].
///
/// Named arguments are matched to declared parameters by name and consumed;
/// positional arguments are appended after every declared parameter.
///
/// ```rust,ignore
/// let args = Arguments::new()
///     .named("recipient", String::from("ops@example.com"))
///     .positional(3u32);
/// container.call("app::Mailer@send", args)?;
/// ```
#[derive(Default)]
pub struct Arguments {
    pub(crate) named: HashMap<String, Object>,
    pub(crate) positional: Vec<Object>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named argument.
    pub fn named(mut self, name: impl Into<String>, value: impl Send + Sync + 'static) -> Self {
        self.named.insert(name.into(), object(value));
        self
    }

    /// Adds an already type-erased named argument.
    pub fn named_object(mut self, name: impl Into<String>, value: Object) -> Self {
        self.named.insert(name.into(), value);
        self
    }

    /// Appends a positional argument.
    pub fn positional(mut self, value: impl Send + Sync + 'static) -> Self {
        self.positional.push(object(value));
        self
    }

    /// Appends an already type-erased positional argument.
    pub fn positional_object(mut self, value: Object) -> Self {
        self.positional.push(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .field("positional", &self.positional.len())
            .finish()
    }
}

/// A declared parameter of a callable or blueprint method.
#[derive(Clone)]
pub struct CallParam {
    pub(crate) name: String,
    pub(crate) kind: CallParamKind,
}

#[derive(Clone)]
pub enum CallParamKind {
    /// Built through the object builder when not supplied by name.
    Class(BindingKey),
    /// Falls back to a default value when not supplied by name.
    Default(DefaultFn),
    /// Must be supplied by name.
    Plain,
}

impl CallParam {
    /// A parameter with no type and no default.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CallParamKind::Plain,
        }
    }

    /// A class-typed parameter.
    pub fn class(name: impl Into<String>, path: impl Into<BindingKey>) -> Self {
        Self {
            name: name.into(),
            kind: CallParamKind::Class(path.into()),
        }
    }

    /// A defaulted parameter.
    pub fn with_default(
        name: impl Into<String>,
        default: impl Fn() -> Object + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: CallParamKind::Default(Arc::new(default)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CallParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            CallParamKind::Class(ref key) => format!("Class({key})"),
            CallParamKind::Default(_) => "Default".to_string(),
            CallParamKind::Plain => "Plain".to_string(),
        };
        write!(f, "CallParam({}: {kind})", self.name)
    }
}

/// An ad-hoc callable: a body plus its declared parameter list.
#[derive(Clone)]
pub struct Callable {
    params: Vec<CallParam>,
    run: CallableFn,
}

impl Callable {
    pub fn new(
        run: impl Fn(&mut crate::blueprint::Args) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params: Vec::new(),
            run: Arc::new(run),
        }
    }

    /// Appends a declared parameter.
    pub fn param(mut self, param: CallParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn parameters(&self) -> &[CallParam] {
        &self.params
    }
}

/// What [`Container::call`] accepts.
pub enum CallTarget<'a> {
    /// A `"class@method"` string.
    Method(&'a str),
    /// An ad-hoc callable.
    Callable(&'a Callable),
}

impl<'a> From<&'a str> for CallTarget<'a> {
    fn from(target: &'a str) -> Self {
        CallTarget::Method(target)
    }
}

impl<'a> From<&'a Callable> for CallTarget<'a> {
    fn from(callable: &'a Callable) -> Self {
        CallTarget::Callable(callable)
    }
}

impl Container {
    /// Calls a `"class@method"` target or an ad-hoc callable, injecting
    /// its declared dependencies.
    ///
    /// See [`Container::call_with_default`] for targets that may omit the
    /// method segment.
    pub fn call<'a>(
        &self,
        target: impl Into<CallTarget<'a>>,
        params: Arguments,
    ) -> Result<Object> {
        self.call_with_default(target, params, None)
    }

    /// Like [`Container::call`], with a fallback method name for string
    /// targets that carry no `@method` segment.
    ///
    /// # Errors
    /// [`ContainerError::InvalidArgument`] when a string target has no
    /// method segment and no default was given, or names a method its
    /// blueprint does not declare.
    pub fn call_with_default<'a>(
        &self,
        target: impl Into<CallTarget<'a>>,
        params: Arguments,
        default_method: Option<&str>,
    ) -> Result<Object> {
        match target.into() {
            CallTarget::Method(target) => self.call_class(target, params, default_method),
            CallTarget::Callable(callable) => {
                let args =
                    self.assemble_call_args(callable.parameters(), params, "<callable>")?;
                let mut args = crate::blueprint::Args::new(args);
                (callable.run)(&mut args)
            }
        }
    }

    /// Resolves a `"class@method"` string: builds the class, then invokes
    /// the named method declared on its blueprint.
    fn call_class(
        &self,
        target: &str,
        params: Arguments,
        default_method: Option<&str>,
    ) -> Result<Object> {
        let mut segments = target.splitn(2, '@');
        let class = segments.next().unwrap_or(target);
        let method_name = segments
            .next()
            .filter(|name| !name.is_empty())
            .or(default_method)
            .ok_or_else(|| {
                ContainerError::InvalidArgument(InvalidArgumentError {
                    target: target.to_string(),
                    detail: "method not provided".to_string(),
                })
            })?;

        trace!(class, method = method_name, "Calling class method");

        let class_key = BindingKey::new(class);
        let method = self
            .blueprint_for(&class_key)
            .and_then(|blueprint| blueprint.find_method(method_name).cloned())
            .ok_or_else(|| {
                ContainerError::InvalidArgument(InvalidArgumentError {
                    target: target.to_string(),
                    detail: format!("no method `{method_name}` on `{class_key}`"),
                })
            })?;

        let receiver = self.build_object(class_key, Vec::new())?;
        let args = self.assemble_call_args(method.parameters(), params, target)?;
        method.invoke(receiver, args)
    }

    /// Fills each declared parameter from named arguments, the object
    /// builder, or defaults; leftover positional arguments go last.
    fn assemble_call_args(
        &self,
        declared: &[CallParam],
        mut supplied: Arguments,
        target: &str,
    ) -> Result<Vec<Object>> {
        let mut args = Vec::with_capacity(declared.len() + supplied.positional.len());

        for param in declared {
            if let Some(value) = supplied.named.remove(&param.name) {
                args.push(value);
                continue;
            }

            match &param.kind {
                CallParamKind::Class(path) => {
                    args.push(self.build_object(path.clone(), Vec::new())?);
                }
                CallParamKind::Default(default) => args.push(default()),
                CallParamKind::Plain => {
                    return Err(ContainerError::MissingArgument(MissingArgumentError {
                        target: target.to_string(),
                        parameter: param.name.clone(),
                    }));
                }
            }
        }

        args.extend(supplied.positional);
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::object;
    use crate::blueprint::{Blueprint, Method};

    struct Mailer {
        transport: String,
    }

    fn mailer_blueprint() -> Blueprint {
        Blueprint::new("invoke_tests::Mailer", |_| {
            Ok(object(Mailer {
                transport: "smtp".to_string(),
            }))
        })
        .method(
            Method::new("send", |receiver, args| {
                let mailer = receiver.downcast::<Mailer>().unwrap();
                let recipient: std::sync::Arc<String> = args.take()?;
                Ok(object(format!("{} via {}", recipient, mailer.transport)))
            })
            .param(CallParam::plain("recipient")),
        )
    }

    #[test]
    fn call_class_method_with_named_argument() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let result = container
            .call(
                "invoke_tests::Mailer@send",
                Arguments::new().named("recipient", String::from("ops")),
            )
            .unwrap();

        assert_eq!(&*result.downcast::<String>().unwrap(), "ops via smtp");
    }

    #[test]
    fn call_uses_default_method() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let result = container
            .call_with_default(
                "invoke_tests::Mailer",
                Arguments::new().named("recipient", String::from("ops")),
                Some("send"),
            )
            .unwrap();

        assert_eq!(&*result.downcast::<String>().unwrap(), "ops via smtp");
    }

    #[test]
    fn call_without_method_fails() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let result = container.call("invoke_tests::Mailer", Arguments::new());

        match result.unwrap_err() {
            ContainerError::InvalidArgument(e) => {
                assert!(e.detail.contains("method not provided"));
            }
            other => panic!("Expected InvalidArgument, got: {other:?}"),
        }
    }

    #[test]
    fn call_unknown_method_fails() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let result = container.call("invoke_tests::Mailer@missing", Arguments::new());

        match result.unwrap_err() {
            ContainerError::InvalidArgument(e) => {
                assert!(e.detail.contains("missing"));
            }
            other => panic!("Expected InvalidArgument, got: {other:?}"),
        }
    }

    #[test]
    fn callable_with_class_param() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let callable = Callable::new(|args| {
            let mailer: std::sync::Arc<Mailer> = args.take()?;
            Ok(object(mailer.transport.clone()))
        })
        .param(CallParam::class("mailer", "invoke_tests::Mailer"));

        let result = container.call(&callable, Arguments::new()).unwrap();
        assert_eq!(&*result.downcast::<String>().unwrap(), "smtp");
    }

    #[test]
    fn callable_prefers_named_over_building() {
        let container = Container::new();
        container.declare(mailer_blueprint());

        let callable = Callable::new(|args| {
            let mailer: std::sync::Arc<Mailer> = args.take()?;
            Ok(object(mailer.transport.clone()))
        })
        .param(CallParam::class("mailer", "invoke_tests::Mailer"));

        let supplied = Mailer {
            transport: "sendmail".to_string(),
        };
        let result = container
            .call(&callable, Arguments::new().named("mailer", supplied))
            .unwrap();

        assert_eq!(&*result.downcast::<String>().unwrap(), "sendmail");
    }

    #[test]
    fn callable_uses_default() {
        let container = Container::new();

        let callable = Callable::new(|args| {
            let count: std::sync::Arc<u32> = args.take()?;
            Ok(object(*count * 2))
        })
        .param(CallParam::with_default("count", || object(21u32)));

        let result = container.call(&callable, Arguments::new()).unwrap();
        assert_eq!(*result.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn callable_unfilled_plain_param_fails() {
        let container = Container::new();

        let callable = Callable::new(|_| Ok(object(()))).param(CallParam::plain("x"));

        let result = container.call(&callable, Arguments::new());

        match result.unwrap_err() {
            ContainerError::MissingArgument(e) => assert_eq!(e.parameter, "x"),
            other => panic!("Expected MissingArgument, got: {other:?}"),
        }
    }

    #[test]
    fn positional_arguments_appended_last() {
        let container = Container::new();

        let callable = Callable::new(|args| {
            let named: std::sync::Arc<String> = args.take()?;
            let extra: std::sync::Arc<i32> = args.take()?;
            Ok(object(format!("{named}-{extra}")))
        })
        .param(CallParam::plain("name"));

        let result = container
            .call(
                &callable,
                Arguments::new()
                    .named("name", String::from("job"))
                    .positional(7i32),
            )
            .unwrap();

        assert_eq!(&*result.downcast::<String>().unwrap(), "job-7");
    }
}
