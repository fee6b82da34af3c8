use super::CheckPass;
use crate::ast::expression::{
    Argument, ArrayElement, ArrowBody, CallExpression, Expression, ExpressionKind, NewExpression,
    ObjectProperty,
};
use crate::ast::statement::Parameter;
use crate::ast::types::Type;
use crate::span::Span;
use crate::typechecker::generics::{
    declaration_mapping, instantiate_signature, instantiate_type, InferenceContext,
};
use crate::typechecker::types::{Signature, TypeId};

impl<'a> CheckPass<'a> {
    pub(super) fn check_call(&mut self, call: &'a CallExpression, span: Span) -> TypeId {
        let callee = self.check_expression(&call.callee, None);
        let common = self.common();

        let nullish = self.nullish_members(callee);
        if !nullish.is_empty() && !call.optional {
            let message = if nullish.contains(&common.null) && nullish.contains(&common.undefined) {
                "Cannot invoke an object which is possibly 'null' or 'undefined'."
            } else if nullish.contains(&common.null) {
                "Cannot invoke an object which is possibly 'null'."
            } else {
                "Cannot invoke an object which is possibly 'undefined'."
            };
            self.error(call.callee.span, message);
        }
        let base = self.store().non_nullable(callee);

        if base == common.any {
            self.check_untyped_arguments(&call.arguments);
            return common.any;
        }

        self.ensure_named_templates(base);
        let signatures = self.checker.call_signatures(base);
        if signatures.is_empty() {
            let message = if base == common.unknown {
                "Object is of type 'unknown'."
            } else {
                "This expression is not callable."
            };
            self.error(call.callee.span, message);
            self.check_untyped_arguments(&call.arguments);
            return common.any;
        }

        let result = self.resolve_call(
            &signatures,
            call.type_arguments.as_deref(),
            &call.arguments,
            span,
        );
        if call.optional && !nullish.is_empty() {
            self.store().union(vec![result, common.undefined])
        } else {
            result
        }
    }

    pub(super) fn check_new(&mut self, new: &'a NewExpression, span: Span) -> TypeId {
        let callee = self.check_expression(&new.callee, None);
        let common = self.common();
        if callee == common.any {
            self.check_untyped_arguments(&new.arguments);
            return common.any;
        }

        if self.abstract_constructors.contains(&callee) {
            self.error(span, "Cannot create an instance of an abstract class.");
        }

        self.ensure_named_templates(callee);
        let signatures = self.checker.construct_signatures(callee);
        if signatures.is_empty() {
            self.error(new.callee.span, "This expression is not constructable.");
            self.check_untyped_arguments(&new.arguments);
            return common.any;
        }
        self.resolve_call(&signatures, new.type_arguments.as_deref(), &new.arguments, span)
    }

    fn check_untyped_arguments(&mut self, arguments: &'a [Argument]) {
        for argument in arguments {
            self.check_expression(&argument.value, None);
        }
    }

    /// Pick the signature a call resolves to and return its result type
    fn resolve_call(
        &mut self,
        signatures: &[Signature],
        type_arguments: Option<&'a [Type]>,
        arguments: &'a [Argument],
        span: Span,
    ) -> TypeId {
        let type_args: Option<Vec<TypeId>> =
            type_arguments.map(|types| types.iter().map(|t| self.resolve_type(t)).collect());
        let has_spread = arguments.iter().any(|argument| argument.is_spread);

        let candidates: Vec<&Signature> = signatures
            .iter()
            .filter(|signature| {
                accepts_argument_count(signature, arguments.len(), has_spread)
                    && type_args
                        .as_ref()
                        .map_or(true, |args| self.accepts_type_argument_count(signature, args.len()))
            })
            .collect();

        match candidates.as_slice() {
            [] => {
                self.report_arity(signatures, type_args.as_deref(), arguments.len(), span);
                self.check_untyped_arguments(arguments);
                self.common().any
            }
            [signature] => {
                let signature =
                    self.instantiate_for_call(signature, type_args.as_deref(), arguments, span);
                self.check_arguments(&signature, arguments);
                signature.return_type
            }
            _ => {
                let chosen = candidates.iter().copied().find(|candidate| {
                    self.speculative += 1;
                    let signature =
                        self.instantiate_for_call(candidate, type_args.as_deref(), arguments, span);
                    let matched = self.check_arguments(&signature, arguments);
                    self.speculative -= 1;
                    matched
                });
                match chosen {
                    Some(candidate) => {
                        let signature =
                            self.instantiate_for_call(candidate, type_args.as_deref(), arguments, span);
                        self.check_arguments(&signature, arguments);
                        signature.return_type
                    }
                    None => {
                        self.error(span, "No overload matches this call.");
                        self.check_untyped_arguments(arguments);
                        let fallback = candidates[0];
                        if fallback.type_parameters.is_empty() {
                            fallback.return_type
                        } else {
                            self.common().any
                        }
                    }
                }
            }
        }
    }

    fn accepts_type_argument_count(&self, signature: &Signature, count: usize) -> bool {
        let (required, total) = self.type_argument_range(signature);
        count >= required && count <= total
    }

    /// Fewest and most type arguments a signature takes
    fn type_argument_range(&self, signature: &Signature) -> (usize, usize) {
        let required = signature
            .type_parameters
            .iter()
            .take_while(|p| self.store().type_parameter(**p).and_then(|info| info.default).is_none())
            .count();
        (required, signature.type_parameters.len())
    }

    fn report_arity(
        &mut self,
        signatures: &[Signature],
        type_args: Option<&[TypeId]>,
        argument_count: usize,
        span: Span,
    ) {
        let [signature] = signatures else {
            self.error(span, "No overload matches this call.");
            return;
        };

        if let Some(args) = type_args {
            if !self.accepts_type_argument_count(signature, args.len()) {
                let (required, total) = self.type_argument_range(signature);
                let expected = if required == total {
                    total.to_string()
                } else {
                    format!("{}-{}", required, total)
                };
                self.error(
                    span,
                    format!(
                        "Expected {} type arguments, but got {}.",
                        expected,
                        args.len()
                    ),
                );
                return;
            }
        }

        let min = signature.min_argument_count();
        let message = match signature.max_argument_count() {
            None => format!(
                "Expected at least {} arguments, but got {}.",
                min, argument_count
            ),
            Some(max) if max == min => {
                format!("Expected {} arguments, but got {}.", max, argument_count)
            }
            Some(max) => format!(
                "Expected {}-{} arguments, but got {}.",
                min, max, argument_count
            ),
        };
        self.error(span, message);
    }

    /// Bind the type parameters of `signature` from explicit type
    /// arguments or from the arguments of the call
    fn instantiate_for_call(
        &mut self,
        signature: &Signature,
        type_args: Option<&[TypeId]>,
        arguments: &'a [Argument],
        span: Span,
    ) -> Signature {
        if signature.type_parameters.is_empty() {
            return signature.clone();
        }

        if let Some(args) = type_args {
            let mapping = declaration_mapping(self.store(), &signature.type_parameters, args);
            let full: Vec<TypeId> = signature
                .type_parameters
                .iter()
                .map(|p| mapping.get(p).copied().unwrap_or(self.common().any))
                .collect();
            self.check_type_constraints(&signature.type_parameters, &full, &mapping, span);
            return instantiate_signature(self.store(), signature, &mapping);
        }

        let mut inference = InferenceContext::new(signature.type_parameters.clone());

        // Arguments that need no contextual signature go first so that
        // function arguments see what they inferred
        for (index, argument) in arguments.iter().enumerate() {
            if argument.is_spread || is_context_sensitive(&argument.value) {
                continue;
            }
            let Some(parameter_type) = self.parameter_type_for_argument(signature, index) else {
                continue;
            };
            let argument_type = self.check_expression(&argument.value, Some(parameter_type));
            inference.infer(&self.checker, argument_type, parameter_type);
        }
        for (index, argument) in arguments.iter().enumerate() {
            if argument.is_spread || !is_context_sensitive(&argument.value) {
                continue;
            }
            let Some(parameter_type) = self.parameter_type_for_argument(signature, index) else {
                continue;
            };
            let partial = inference.partial_mapping(&self.checker);
            let contextual = instantiate_type(self.store(), parameter_type, &partial);
            let argument_type = self.check_expression(&argument.value, Some(contextual));
            inference.infer(&self.checker, argument_type, parameter_type);
        }

        let mapping = inference.mapping(&self.checker, signature);
        instantiate_signature(self.store(), signature, &mapping)
    }

    /// Check every argument against its parameter; false on a mismatch
    fn check_arguments(&mut self, signature: &Signature, arguments: &'a [Argument]) -> bool {
        let mut matched = true;
        for (index, argument) in arguments.iter().enumerate() {
            if argument.is_spread {
                let spread = self.check_expression(&argument.value, None);
                let element = self.checker.element_type(spread);
                if let Some(parameter_type) = self.parameter_type_for_argument(signature, index) {
                    if !self.is_assignable(element, parameter_type) {
                        matched = false;
                        self.report_argument(element, parameter_type, argument.span);
                    }
                }
                continue;
            }

            let Some(parameter_type) = self.parameter_type_for_argument(signature, index) else {
                self.check_expression(&argument.value, None);
                continue;
            };
            let actual = self.check_expression(&argument.value, Some(parameter_type));
            if !self.is_assignable(actual, parameter_type) {
                matched = false;
                self.report_argument(actual, parameter_type, argument.span);
            }
        }
        matched
    }

    fn report_argument(&mut self, actual: TypeId, parameter_type: TypeId, span: Span) {
        let message = format!(
            "Argument of type '{}' is not assignable to parameter of type '{}'.",
            self.display(actual),
            self.display(parameter_type)
        );
        self.error(span, message);
    }

    /// Type an argument at `index` is checked against
    pub(super) fn parameter_type_for_argument(&self, signature: &Signature, index: usize) -> Option<TypeId> {
        let parameters = &signature.parameters;
        let parameter = match parameters.get(index) {
            Some(parameter) => parameter,
            None => parameters.last().filter(|p| p.rest)?,
        };
        if parameter.rest {
            return Some(self.checker.element_type(parameter.type_id));
        }
        if parameter.optional && self.strict_null_checks() {
            let undefined = self.common().undefined;
            return Some(self.store().union(vec![parameter.type_id, undefined]));
        }
        Some(parameter.type_id)
    }

    /// Contextual type of a rest parameter declared at `index`: whatever
    /// the contextual signature still takes from there on
    pub(super) fn contextual_rest_type(&self, signature: &Signature, index: usize) -> Option<TypeId> {
        let remaining = signature.parameters.get(index..).unwrap_or_default();
        match remaining {
            [only] if only.rest => Some(only.type_id),
            _ if remaining.last().is_some_and(|p| p.rest) => {
                let elements = remaining
                    .iter()
                    .map(|p| {
                        if p.rest {
                            self.checker.element_type(p.type_id)
                        } else {
                            p.type_id
                        }
                    })
                    .collect();
                let element = self.store().union(elements);
                Some(self.store().array(element, false))
            }
            _ => {
                let elements = remaining.iter().map(|p| p.type_id).collect();
                Some(self.store().tuple(elements, false))
            }
        }
    }
}

fn accepts_argument_count(signature: &Signature, count: usize, has_spread: bool) -> bool {
    if has_spread {
        return true;
    }
    count >= signature.min_argument_count()
        && signature.max_argument_count().map_or(true, |max| count <= max)
}

/// Expressions whose type depends on the contextual type of their position
fn is_context_sensitive(expression: &Expression) -> bool {
    match &expression.kind {
        ExpressionKind::Arrow(arrow) => {
            has_untyped_parameter(&arrow.parameters)
                || match &arrow.body {
                    ArrowBody::Expression(body) => {
                        arrow.parameters.is_empty() && is_context_sensitive(body)
                    }
                    ArrowBody::Block(_) => false,
                }
        }
        ExpressionKind::Function(function) => has_untyped_parameter(&function.parameters),
        ExpressionKind::Object(properties) => properties.iter().any(|property| match property {
            ObjectProperty::Property { value, .. } => is_context_sensitive(value),
            ObjectProperty::Method { function, .. } => has_untyped_parameter(&function.parameters),
            ObjectProperty::Shorthand(_) | ObjectProperty::Spread { .. } => false,
        }),
        ExpressionKind::Array(elements) => elements.iter().any(|element| match element {
            ArrayElement::Expression(value) => is_context_sensitive(value),
            ArrayElement::Spread(_) => false,
        }),
        ExpressionKind::Parenthesized(inner) => is_context_sensitive(inner),
        ExpressionKind::Conditional(_, a, b) => is_context_sensitive(a) || is_context_sensitive(b),
        _ => false,
    }
}

fn has_untyped_parameter(parameters: &[Parameter]) -> bool {
    parameters
        .iter()
        .any(|parameter| parameter.type_annotation.is_none())
}
