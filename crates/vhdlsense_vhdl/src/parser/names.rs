//! Names and expressions.
//!
//! A VHDL name can denote a slice, an indexed name, a function call, a type
//! conversion, an attribute, an expanded name or a record reference — often
//! not decidable locally. `parse_name` keeps the ambiguous shapes ambiguous
//! and leaves the decision to the binder; the few decidable cases (slice vs
//! call, named association) are settled with structured lookahead.

use super::Parser;
use crate::lexer::LookParams;
use crate::syntax::*;
use crate::token::{Kind, Token};

const EXPECTED_NAME: &str = "Expected name";
const EXPECTED_SEL_NAME: &str = "Expected selected name";
const EXPECTED_EXPRESSION: &str = "Expecting an expression";
const PLUS_MINUS_SKIP: &str = "+ and - cannot be used directly. Skipping this. Use parenthesis";

/// Customizes `parse_name` for the surrounding context.
#[derive(Clone, Copy)]
pub struct NameOptions {
    /// Whether a parenthesized suffix (slice, index, call, qualified
    /// expression) may be consumed. Type marks set this to false.
    pub allow_qifts: bool,
    /// Whether anything beyond a simple name may be consumed.
    pub allow_complex_names: bool,
    /// Whether a trailing `[ signature ]` may be consumed (alias
    /// declarations and entity designators).
    pub allow_signature: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        NameOptions {
            allow_qifts: true,
            allow_complex_names: true,
            allow_signature: false,
        }
    }
}

impl<'src, 'st> Parser<'src, 'st> {
    // ------------------------------------------------------------------------
    // Names (LRM93 6.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_name(&mut self) -> Option<Name> {
        self.parse_name_with(NameOptions::default())
    }

    pub(crate) fn parse_name_with(&mut self, options: NameOptions) -> Option<Name> {
        let first = self.lexer.current_location();

        let mut result = match self.current() {
            Kind::Identifier | Kind::ExtendedIdentifier | Kind::Character | Kind::StringLiteral => {
                let identifier = self.lexer.current_token();
                self.skip();
                Name::new(first, NameKind::Simple { identifier })
            }
            _ => {
                self.diag(EXPECTED_NAME);
                return None;
            }
        };

        if !options.allow_complex_names {
            return Some(result);
        }

        while self.current() != Kind::Eof {
            match self.current() {
                Kind::Tick => {
                    // attribute name or qualified expression
                    if self.peek(1) != Kind::LeftPar {
                        result = self.parse_attribute_name(first, result)?;
                    } else if options.allow_qifts {
                        return self.parse_qualified_expression(first, result);
                    } else {
                        return Some(result);
                    }
                }
                Kind::LeftSquare => {
                    if options.allow_signature {
                        return self.parse_signed_name(first, result);
                    }
                    result = self.parse_signed_name(first, result)?;
                }
                Kind::LeftPar => {
                    if !options.allow_qifts {
                        return Some(result);
                    }
                    result = self.parse_parenthesis_name(first, result)?;
                }
                Kind::Dot => {
                    result = self.parse_selected_name(first, result)?;
                }
                _ => return Some(result),
            }
        }

        Some(result)
    }

    // prefix . suffix
    fn parse_selected_name(&mut self, first: vhdlsense_base::Location, prefix: Name) -> Option<Name> {
        self.consume(Kind::Dot);

        match self.current() {
            Kind::Identifier
            | Kind::ExtendedIdentifier
            | Kind::Character
            | Kind::StringLiteral
            | Kind::KwAll => {
                let identifier = self.lexer.current_token();
                self.skip();
                Some(Name::new(
                    first.span_to(self.lexer.previous_location()),
                    NameKind::Selected { prefix: Box::new(prefix), identifier },
                ))
            }
            _ => {
                self.diag(EXPECTED_SEL_NAME);
                None
            }
        }
    }

    // prefix ( ... ) — slice, indexed name, call with named association, or
    // the ambiguous call/index/conversion shape.
    fn parse_parenthesis_name(
        &mut self,
        first: vhdlsense_base::Location,
        prefix: Name,
    ) -> Option<Name> {
        let direction_ahead = {
            let params = LookParams {
                look: [Kind::KwDownto, Kind::KwTo, Kind::KwRange, Kind::Invalid],
                stop: [Kind::RightPar, Kind::Comma, Kind::Invalid, Kind::Invalid],
                abort: Kind::Semicolon,
                nest_in: Kind::LeftPar,
                nest_out: Kind::RightPar,
                depth: 1,
            };
            self.lexer.look_for(&params)
        };

        if direction_ahead {
            self.consume(Kind::LeftPar);
            let range = self.parse_discrete_range();
            self.consume(Kind::RightPar);

            return Some(Name::new(
                first.span_to(self.lexer.previous_location()),
                NameKind::Slice { prefix: Box::new(prefix), range: range? },
            ));
        }

        let arrow_ahead = {
            let params = LookParams {
                look: [Kind::RightArrow, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                stop: [Kind::RightPar, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                abort: Kind::Semicolon,
                nest_in: Kind::LeftPar,
                nest_out: Kind::RightPar,
                depth: 1,
            };
            self.lexer.look_for(&params)
        };

        if arrow_ahead {
            self.consume(Kind::LeftPar);
            let args = self.parse_association_list();
            self.consume(Kind::RightPar);

            return Some(Name::new(
                first.span_to(self.lexer.previous_location()),
                NameKind::Fcall { prefix: Box::new(prefix), args },
            ));
        }

        // wawa(1) can be an indexed name, a call with arguments, or an index
        // into a parameterless call's result. Kept ambiguous.
        self.consume(Kind::LeftPar);

        let mut args = Vec::new();
        loop {
            if let Some(e) = self.parse_expression() {
                args.push(e);
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }

        self.consume(Kind::RightPar);

        Some(Name::new(
            first.span_to(self.lexer.previous_location()),
            NameKind::Ambiguous { prefix: Box::new(prefix), args },
        ))
    }

    // prefix [ mark, ... return mark ]
    fn parse_signed_name(&mut self, first: vhdlsense_base::Location, prefix: Name) -> Option<Name> {
        let signature = self.parse_signature()?;
        Some(Name::new(
            first.span_to(self.lexer.previous_location()),
            NameKind::Signature { prefix: Box::new(prefix), signature },
        ))
    }

    // signature ::= [ [ type_mark { , type_mark } ] [ RETURN type_mark ] ]
    pub(crate) fn parse_signature(&mut self) -> Option<SignatureSpec> {
        let first = self.eat(Kind::LeftSquare);

        let mut marks = Vec::new();
        while self.current() == Kind::Identifier {
            if let Some(mark) = self.parse_type_mark() {
                marks.push(mark);
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }

        let return_mark = if self.optional(Kind::KwReturn) {
            self.parse_type_mark().map(Box::new)
        } else {
            None
        };

        self.consume(Kind::RightSquare);

        Some(SignatureSpec {
            span: first.span_to(self.lexer.previous_location()),
            marks,
            return_mark,
        })
    }

    // prefix ' attr [ ( expr ) ]
    fn parse_attribute_name(&mut self, first: vhdlsense_base::Location, prefix: Name) -> Option<Name> {
        self.consume(Kind::Tick);

        let mut attr = self.lexer.current_token();
        // 'range is a valid attribute even though range is a reserved word
        if attr.kind == Kind::KwRange {
            attr = Token::new(Kind::Identifier, attr.value, attr.location);
        }
        self.skip();

        let expression = if self.optional(Kind::LeftPar) {
            let e = self.parse_expression().map(Box::new);
            self.consume(Kind::RightPar);
            e
        } else {
            None
        };

        Some(Name::new(
            first.span_to(self.lexer.previous_location()),
            NameKind::Attribute { prefix: Box::new(prefix), identifier: attr, expression },
        ))
    }

    // prefix ' ( expression )
    fn parse_qualified_expression(
        &mut self,
        first: vhdlsense_base::Location,
        prefix: Name,
    ) -> Option<Name> {
        self.consume(Kind::Tick);

        let expression = self.parse_primary().map(Box::new);

        Some(Name::new(
            first.span_to(self.lexer.previous_location()),
            NameKind::Qualified { prefix: Box::new(prefix), expression: expression? },
        ))
    }

    // ------------------------------------------------------------------------
    // Expressions (LRM93 7.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_expression(&mut self) -> Option<Expression> {
        self.parse_boolean_expression()
    }

    // expression ::= relation { AND relation } | relation { OR relation }
    //              | relation [ NAND relation ] | relation [ NOR relation ]
    //              | relation { XOR relation } | relation { XNOR relation }
    //
    // nand and nor are non-associative: a single occurrence is accepted.
    fn parse_boolean_expression(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();
        let mut result = self.parse_relation()?;

        loop {
            match self.current() {
                Kind::KwNand | Kind::KwNor => {
                    let op = self.lexer.current_token();
                    self.skip();
                    let rhs = self.parse_relation()?;
                    return Some(Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Binary {
                            op,
                            lhs: Box::new(result),
                            rhs: Box::new(rhs),
                        },
                    });
                }
                Kind::KwAnd | Kind::KwOr | Kind::KwXor | Kind::KwXnor => {
                    let op = self.lexer.current_token();
                    self.skip();
                    let rhs = self.parse_relation()?;
                    result = Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Binary {
                            op,
                            lhs: Box::new(result),
                            rhs: Box::new(rhs),
                        },
                    };
                }
                _ => return Some(result),
            }
        }
    }

    // relation ::= shift_expression [ relational_operator shift_expression ]
    fn parse_relation(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();
        let result = self.parse_shift_expression()?;

        match self.current() {
            Kind::Eq | Kind::Ne | Kind::Lt | Kind::Lte | Kind::Gt | Kind::Gte => {
                let op = self.lexer.current_token();
                self.skip();
                let rhs = self.parse_shift_expression()?;
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Binary { op, lhs: Box::new(result), rhs: Box::new(rhs) },
                })
            }
            _ => Some(result),
        }
    }

    // shift_expression ::= simple_expression [ shift_operator simple_expression ]
    fn parse_shift_expression(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();
        let mut result = self.parse_simple_expression()?;

        loop {
            match self.current() {
                Kind::KwSll | Kind::KwSrl | Kind::KwSla | Kind::KwSra | Kind::KwRol
                | Kind::KwRor => {
                    let op = self.lexer.current_token();
                    self.skip();
                    let rhs = self.parse_simple_expression()?;
                    result = Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Binary { op, lhs: Box::new(result), rhs: Box::new(rhs) },
                    };
                }
                _ => return Some(result),
            }
        }
    }

    // simple_expression ::= [ sign ] term { adding_operator term }
    fn parse_simple_expression(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();

        let mut result = match self.current() {
            Kind::Plus | Kind::Minus => {
                let op = self.lexer.current_token();
                self.skip();
                let operand = self.parse_term()?;
                Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Unary { op, operand: Box::new(operand) },
                }
            }
            _ => self.parse_term()?,
        };

        loop {
            match self.current() {
                Kind::Plus | Kind::Minus | Kind::Concat => {
                    let op = self.lexer.current_token();
                    self.skip();
                    let rhs = self.parse_term()?;
                    result = Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Binary { op, lhs: Box::new(result), rhs: Box::new(rhs) },
                    };
                }
                _ => return Some(result),
            }
        }
    }

    // term ::= factor { multiplying_operator factor }
    fn parse_term(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();
        let mut result = self.parse_factor()?;

        loop {
            match self.current() {
                Kind::Times | Kind::Div | Kind::KwMod | Kind::KwRem => {
                    let op = self.lexer.current_token();
                    self.skip();
                    let rhs = self.parse_factor()?;
                    result = Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Binary { op, lhs: Box::new(result), rhs: Box::new(rhs) },
                    };
                }
                _ => return Some(result),
            }
        }
    }

    // factor ::= primary [ ** primary ] | ABS primary | NOT primary
    fn parse_factor(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();

        match self.current() {
            Kind::KwAbs | Kind::KwNot => {
                let op = self.lexer.current_token();
                self.skip();
                let operand = self.parse_primary()?;
                return Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Unary { op, operand: Box::new(operand) },
                });
            }
            _ => {}
        }

        let result = self.parse_primary()?;

        if self.current() == Kind::Pow {
            let op = self.lexer.current_token();
            self.skip();
            // exponentiation is right-associative
            let rhs = self.parse_factor()?;
            return Some(Expression {
                span: first.span_to(self.lexer.previous_location()),
                kind: ExprKind::Binary { op, lhs: Box::new(result), rhs: Box::new(rhs) },
            });
        }

        Some(result)
    }

    pub(crate) fn parse_primary(&mut self) -> Option<Expression> {
        let first = self.lexer.current_location();

        match self.current() {
            Kind::Integer | Kind::Real => {
                let literal = self.lexer.current_token();
                let kind = if literal.kind == Kind::Integer {
                    LiteralKind::Integer
                } else {
                    LiteralKind::Real
                };
                self.skip();

                if self.current() == Kind::Identifier {
                    // physical literal: 10 ns
                    let unit = self.parse_name().map(Box::new)?;
                    return Some(Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Physical { token: literal, unit },
                    });
                }

                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Literal { kind, token: literal },
                })
            }

            Kind::Identifier | Kind::ExtendedIdentifier => {
                let name = self.parse_name().map(Box::new)?;
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Unresolved { name },
                })
            }

            Kind::Character => {
                let options = NameOptions { allow_complex_names: false, ..NameOptions::default() };
                let name = self.parse_name_with(options).map(Box::new)?;
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Unresolved { name },
                })
            }

            Kind::LeftPar => {
                let comma_or_arrow = LookParams {
                    look: [Kind::Comma, Kind::RightArrow, Kind::Invalid, Kind::Invalid],
                    stop: [Kind::RightPar, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                    abort: Kind::Semicolon,
                    nest_in: Kind::LeftPar,
                    nest_out: Kind::RightPar,
                    depth: 1,
                };
                if self.lexer.look_for(&comma_or_arrow) {
                    return self.parse_aggregate();
                }

                self.consume(Kind::LeftPar);
                let expr = self.parse_boolean_expression();
                self.consume(Kind::RightPar);

                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Nested { expr: Box::new(expr?) },
                })
            }

            Kind::StringLiteral => {
                if self.peek(1) == Kind::LeftPar {
                    // operator symbol used as a call: "+"(a, b)
                    let name = self.parse_name().map(Box::new)?;
                    return Some(Expression {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: ExprKind::Unresolved { name },
                    });
                }

                let token = self.lexer.current_token();
                self.skip();
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Literal { kind: LiteralKind::String, token },
                })
            }

            Kind::BitString => {
                let token = self.lexer.current_token();
                self.skip();
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Literal { kind: LiteralKind::BitString, token },
                })
            }

            Kind::KwNull => {
                self.skip();
                Some(Expression { span: first, kind: ExprKind::Null })
            }

            Kind::KwNew => self.parse_allocator(),

            Kind::Plus | Kind::Minus => {
                self.diag(PLUS_MINUS_SKIP);
                self.skip();
                let expr = self.parse_boolean_expression()?;
                Some(Expression {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: ExprKind::Nested { expr: Box::new(expr) },
                })
            }

            _ => {
                self.diag(EXPECTED_EXPRESSION);
                None
            }
        }
    }

    // aggregate ::= ( element_association { , element_association } )
    pub(crate) fn parse_aggregate(&mut self) -> Option<Expression> {
        let first = self.eat(Kind::LeftPar);

        let mut elements = Vec::new();
        loop {
            if let Some(element) = self.parse_element_association() {
                elements.push(element);
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }

        self.consume(Kind::RightPar);

        Some(Expression {
            span: first.span_to(self.lexer.previous_location()),
            kind: ExprKind::Aggregate { elements },
        })
    }

    // element_association ::= [ choices => ] expression
    fn parse_element_association(&mut self) -> Option<ElementAssociation> {
        let arrow_ahead = {
            let params = LookParams {
                look: [Kind::RightArrow, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                stop: [Kind::Comma, Kind::RightPar, Kind::Invalid, Kind::Invalid],
                abort: Kind::Semicolon,
                nest_in: Kind::LeftPar,
                nest_out: Kind::RightPar,
                depth: 0,
            };
            self.lexer.look_for(&params)
        };

        let choices = if arrow_ahead {
            let c = self.parse_choices();
            self.consume(Kind::RightArrow);
            c
        } else {
            Vec::new()
        };

        let expression = self.parse_expression()?;
        Some(ElementAssociation { choices, expression })
    }

    // choices ::= choice { | choice }
    pub(crate) fn parse_choices(&mut self) -> Vec<Choice> {
        let mut result = Vec::new();
        loop {
            if let Some(choice) = self.parse_choice() {
                result.push(choice);
            }
            if !self.optional(Kind::Bar) {
                break;
            }
        }
        result
    }

    // choice ::= simple_expression | discrete_range | OTHERS
    fn parse_choice(&mut self) -> Option<Choice> {
        if self.current() == Kind::KwOthers {
            return Some(Choice::Others(self.eat(Kind::KwOthers)));
        }

        self.lexer.add_checkpoint();
        let e = self.parse_expression();

        match self.current() {
            Kind::KwTo | Kind::KwDownto => {
                self.lexer.backtrack();
                self.parse_discrete_range().map(Choice::DiscreteRange)
            }
            _ => {
                self.lexer.drop_checkpoint();
                e.map(Choice::Expression)
            }
        }
    }

    // allocator ::= NEW subtype_indication | NEW qualified_expression
    fn parse_allocator(&mut self) -> Option<Expression> {
        let first = self.eat(Kind::KwNew);

        let subtype = self.parse_subtype_indication();

        Some(Expression {
            span: first.span_to(self.lexer.previous_location()),
            kind: ExprKind::Allocator { subtype, qualified: None },
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::syntax::*;
    use crate::token::{Kind, Version};
    use vhdlsense_base::StringTable;

    fn first_value(src: &str) -> Expression {
        let full = format!("package p is constant k : integer := {src}; end package;");
        let mut st = StringTable::new();
        let parser = Parser::new(full.as_bytes(), &mut st, "test.vhd", Version::Vhdl93);
        let (mut units, diags) = parser.parse();
        assert!(diags.is_empty(), "{src}: {diags:?}");
        let DesignUnitKind::Package(mut p) = units.remove(0).kind else {
            panic!()
        };
        let DeclKind::Object(o) = p.decls.remove(0).kind else { panic!() };
        o.value.expect("value")
    }

    fn op_of(e: &Expression) -> Kind {
        match &e.kind {
            ExprKind::Binary { op, .. } | ExprKind::Unary { op, .. } => op.kind,
            other => panic!("expected operator node, got {other:?}"),
        }
    }

    #[test]
    fn adding_binds_tighter_than_relational() {
        let e = first_value("a + b = c");
        assert_eq!(op_of(&e), Kind::Eq);
        let ExprKind::Binary { lhs, .. } = &e.kind else { panic!() };
        assert_eq!(op_of(lhs), Kind::Plus);
    }

    #[test]
    fn multiplying_binds_tighter_than_adding() {
        let e = first_value("a + b * c");
        assert_eq!(op_of(&e), Kind::Plus);
        let ExprKind::Binary { rhs, .. } = &e.kind else { panic!() };
        assert_eq!(op_of(rhs), Kind::Times);
    }

    #[test]
    fn power_binds_tightest_and_is_right_associative() {
        let e = first_value("a ** b ** c");
        assert_eq!(op_of(&e), Kind::Pow);
        let ExprKind::Binary { rhs, .. } = &e.kind else { panic!() };
        assert_eq!(op_of(rhs), Kind::Pow);
    }

    #[test]
    fn logical_operators_chain_left() {
        let e = first_value("a and b and c");
        assert_eq!(op_of(&e), Kind::KwAnd);
        let ExprKind::Binary { lhs, .. } = &e.kind else { panic!() };
        assert_eq!(op_of(lhs), Kind::KwAnd);
    }

    #[test]
    fn nand_is_non_associative() {
        // a nand b nand c parses as (a nand b) with the trailing operator
        // left for the enclosing context to complain about
        let full = "package p is constant k : integer := a nand b; end package;";
        let mut st = StringTable::new();
        let parser = Parser::new(full.as_bytes(), &mut st, "t.vhd", Version::Vhdl93);
        let (units, diags) = parser.parse();
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn aggregate_with_choices() {
        let e = first_value("(0 => x, others => y)");
        let ExprKind::Aggregate { elements } = &e.kind else { panic!("{e:?}") };
        assert_eq!(elements.len(), 2);
        assert!(matches!(elements[1].choices[0], Choice::Others(_)));
    }

    #[test]
    fn physical_literal() {
        let e = first_value("10 ns");
        assert!(matches!(e.kind, ExprKind::Physical { .. }));
    }

    #[test]
    fn nested_expression() {
        let e = first_value("(a + b)");
        assert!(matches!(e.kind, ExprKind::Nested { .. }));
    }

    #[test]
    fn character_literal_is_a_name_expression() {
        let e = first_value("'0'");
        assert!(matches!(e.kind, ExprKind::Unresolved { .. }));
    }

    #[test]
    fn indexed_name_stays_ambiguous() {
        let e = first_value("mem(3)");
        let ExprKind::Unresolved { name } = &e.kind else { panic!() };
        assert!(matches!(name.kind, NameKind::Ambiguous { .. }));
    }

    #[test]
    fn slice_name_is_distinguished_from_call() {
        let e = first_value("word(7 downto 0)");
        let ExprKind::Unresolved { name } = &e.kind else { panic!() };
        assert!(matches!(name.kind, NameKind::Slice { .. }));
    }

    #[test]
    fn named_association_call() {
        let e = first_value("f(x => 1, y => 2)");
        let ExprKind::Unresolved { name } = &e.kind else { panic!() };
        let NameKind::Fcall { args, .. } = &name.kind else { panic!("{name:?}") };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn attribute_name_with_reserved_range_word() {
        let e = first_value("vec'range");
        let ExprKind::Unresolved { name } = &e.kind else { panic!() };
        let NameKind::Attribute { identifier, .. } = &name.kind else { panic!("{name:?}") };
        assert_eq!(identifier.kind, Kind::Identifier);
    }

    #[test]
    fn selected_name_chain() {
        let e = first_value("work.pkg.thing");
        let ExprKind::Unresolved { name } = &e.kind else { panic!() };
        let NameKind::Selected { prefix, .. } = &name.kind else { panic!() };
        assert!(matches!(prefix.kind, NameKind::Selected { .. }));
    }
}
