//! Sequential and concurrent statements.

use super::{NameOptions, ParseState, Parser};
use crate::lexer::LookParams;
use crate::parser::decls::DeclarativePart;
use crate::syntax::*;
use crate::token::{Kind, Token, Version};

const EXPECTING_ASSIGNMENT: &str = "Expecting a signal assignment or a variable assignment";
const EXPECTING_SEQ_STMT: &str =
    "Expecting a signal assignment, variable assignment or a procedure call";
const WAIT_ON_UNTIL_FOR_SEMIC: &str = "Expecting on, until, for or a semicolon";
const WAIT_UNTIL_FOR_SEMIC: &str = "Expecting until, for or a semicolon";
const WAIT_FOR_SEMIC: &str = "Expecting for or a semicolon";
const WAIT_ONLY_NAME_SENSITIVITY: &str = "Only names allowed in a sensitivity list";
const WAIT_ONLY_ONE_SENSITIVITY: &str = "Only one sensitivity lists is allowed";
const WAIT_ONLY_ONE_CONDITION: &str = "Only one condition is allowed";
const ASSERT_REPORT_BEFORE_SEVERITY: &str = "report must be before severity";
const REPORT_VHDL87: &str = "report statement is not allowed in vhdl87";
const CASE_MISSING_ALTERNATIVE: &str = "Missing alternative in case statement";
const PARAM_SPEC_EXPECTING_IDENT: &str = "Expecting identifier here";
const UNAFFECTED_WAVEFORMS_VHDL87: &str = "Unaffected waveforms is not allowed in vhdl87";
const REJECT_VHDL87: &str = "reject delay mechanism is not allowed in vhdl87";
const INERTIAL_VHDL87: &str = "inertial delay mechanism is not allowed in vhdl87";
const INST_LABEL: &str = "Component instantiation must have a label";
const GENERATE_LABEL: &str = "Generate must have a label";
const BLOCK_LABEL: &str = "Block statement must have a label";
const BLOCK_GUARD: &str = "Right parenthesis expected after guard expression";
const IS_NOT_ALLOWED_IN_VHDL87: &str = "Is is not allowed here in vhdl87";

impl<'src, 'st> Parser<'src, 'st> {
    // ------------------------------------------------------------------------
    // Sequential statements (LRM93 8.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_sequential_statement(&mut self) -> Option<SequentialStatement> {
        let first = self.lexer.current_location();
        let label = self.parse_optional_label();

        let kind = match self.current() {
            Kind::KwWait => self.parse_wait_statement(),
            Kind::KwAssert => self.parse_assertion_statement(),
            Kind::KwReport => {
                if self.version < Version::Vhdl93 {
                    self.diag(REPORT_VHDL87);
                }
                self.parse_report_statement()
            }
            Kind::KwIf => self.parse_if_statement().map(SeqStmt::If),
            Kind::KwFor => self.parse_for_loop_statement(),
            Kind::KwWhile | Kind::KwLoop => self.parse_while_loop_statement(),
            Kind::KwCase => self.parse_case_statement(),
            Kind::KwNext => self.parse_next_statement(),
            Kind::KwExit => self.parse_exit_statement(),
            Kind::KwReturn => self.parse_return_statement(),
            Kind::KwNull => {
                self.consume(Kind::KwNull);
                self.consume(Kind::Semicolon);
                Some(SeqStmt::Null)
            }
            Kind::Identifier | Kind::StringLiteral | Kind::LeftPar => {
                self.parse_assignment_or_procedure_call()
            }
            _ => {
                self.diag(EXPECTING_SEQ_STMT);
                None
            }
        }?;

        Some(SequentialStatement {
            span: first.span_to(self.lexer.previous_location()),
            label,
            kind,
        })
    }

    // LRM93 8.1
    //
    // wait_statement ::=
    //     WAIT [ sensitivity_clause ] [ condition_clause ] [ timeout_clause ] ;
    fn parse_wait_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwWait);

        let mut on = Vec::new();
        let mut until = None;
        let mut timeout = None;

        if self.optional(Kind::KwOn) {
            loop {
                match self.current() {
                    Kind::Identifier => {
                        if let Some(n) = self.parse_name() {
                            on.push(n);
                        }
                    }
                    _ => {
                        self.diag(WAIT_ONLY_NAME_SENSITIVITY);
                        break;
                    }
                }
                if !self.optional(Kind::Comma) {
                    break;
                }
            }
        }
        if self.current() == Kind::KwOn {
            self.diag(WAIT_ONLY_ONE_SENSITIVITY);
            self.resync_to_next_semicolon(false);
        }

        if self.optional(Kind::KwUntil) {
            until = self.parse_expression();
        }
        if self.current() == Kind::KwUntil {
            self.diag(WAIT_ONLY_ONE_CONDITION);
            self.resync_to_next_semicolon(false);
        }

        if self.optional(Kind::KwFor) {
            timeout = self.parse_expression();
        }

        match self.current() {
            Kind::Semicolon => self.consume(Kind::Semicolon),
            _ => {
                let msg = if on.is_empty() && until.is_none() {
                    WAIT_ON_UNTIL_FOR_SEMIC
                } else if until.is_none() {
                    WAIT_UNTIL_FOR_SEMIC
                } else {
                    WAIT_FOR_SEMIC
                };
                self.diag(msg);
                self.resync_to_next_semicolon(true);
            }
        }

        Some(SeqStmt::Wait { on, until, timeout })
    }

    // LRM93 8.2
    //
    // assertion_statement ::=
    //     ASSERT condition [ REPORT expression ] [ SEVERITY expression ] ;
    fn parse_assertion_statement(&mut self) -> Option<SeqStmt> {
        let (condition, report, severity) = self.parse_assertion_tail()?;
        Some(SeqStmt::Assertion { condition, report, severity })
    }

    pub(crate) fn parse_assertion_tail(
        &mut self,
    ) -> Option<(Expression, Option<Expression>, Option<Expression>)> {
        self.consume(Kind::KwAssert);

        let condition = self.parse_expression();

        let mut report = None;
        let mut severity = None;

        if self.optional(Kind::KwReport) {
            report = self.parse_expression();
        }
        if self.optional(Kind::KwSeverity) {
            severity = self.parse_expression();
        }
        if self.current() == Kind::KwReport {
            // severity came first
            self.diag(ASSERT_REPORT_BEFORE_SEVERITY);
            self.consume(Kind::KwReport);
            report = self.parse_expression();
        }

        self.consume(Kind::Semicolon);

        Some((condition?, report, severity))
    }

    // LRM93 8.3
    //
    // report_statement ::= REPORT expression [ SEVERITY expression ] ;
    fn parse_report_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwReport);

        let report = self.parse_expression();

        let severity = if self.optional(Kind::KwSeverity) {
            self.parse_expression()
        } else {
            None
        };

        self.consume(Kind::Semicolon);

        Some(SeqStmt::Report { report: report?, severity })
    }

    // LRM93 8.4 / 8.5 / 8.6
    //
    // The target has been spotted; decide between `<=`, `:=` and a
    // procedure call.
    fn parse_assignment_or_procedure_call(&mut self) -> Option<SeqStmt> {
        let target = self.parse_target()?;

        match self.current() {
            Kind::Lte => {
                self.consume(Kind::Lte);
                let delay = self.parse_delay_mechanism();
                let waveforms = self.parse_waveform();
                self.consume(Kind::Semicolon);
                Some(SeqStmt::SignalAssign { target, delay, waveforms })
            }
            Kind::ColonEq => {
                self.consume(Kind::ColonEq);
                let value = self.parse_expression();
                self.consume(Kind::Semicolon);
                Some(SeqStmt::VariableAssign { target, value: value? })
            }
            Kind::Semicolon => {
                self.consume(Kind::Semicolon);
                match target {
                    Target::Name(procedure) => Some(SeqStmt::ProcedureCall { procedure }),
                    Target::Aggregate(_) => {
                        self.diag(EXPECTING_ASSIGNMENT);
                        None
                    }
                }
            }
            _ => {
                self.diag(EXPECTING_ASSIGNMENT);
                self.resync_to_next_semicolon(true);
                None
            }
        }
    }

    pub(crate) fn parse_target(&mut self) -> Option<Target> {
        if self.current() == Kind::LeftPar {
            return self.parse_aggregate().map(Target::Aggregate);
        }
        self.parse_name().map(Target::Name)
    }

    // delay_mechanism ::= TRANSPORT | [ REJECT time_expression ] INERTIAL
    pub(crate) fn parse_delay_mechanism(&mut self) -> Option<DelayMechanism> {
        match self.current() {
            Kind::KwTransport => {
                self.consume(Kind::KwTransport);
                Some(DelayMechanism::Transport)
            }
            Kind::KwReject => {
                if self.version < Version::Vhdl93 {
                    self.diag(REJECT_VHDL87);
                }
                self.consume(Kind::KwReject);
                let reject = self.parse_expression();
                self.consume(Kind::KwInertial);
                Some(DelayMechanism::Inertial { reject })
            }
            Kind::KwInertial => {
                if self.version < Version::Vhdl93 {
                    self.diag(INERTIAL_VHDL87);
                }
                self.consume(Kind::KwInertial);
                Some(DelayMechanism::Inertial { reject: None })
            }
            _ => None,
        }
    }

    // waveform ::= waveform_element { , waveform_element } | UNAFFECTED
    pub(crate) fn parse_waveform(&mut self) -> Vec<WaveformElement> {
        if self.current() == Kind::KwUnaffected {
            if self.version < Version::Vhdl93 {
                self.diag(UNAFFECTED_WAVEFORMS_VHDL87);
            }
            self.consume(Kind::KwUnaffected);
            return vec![WaveformElement { value: None, after: None }];
        }

        let mut result = Vec::new();
        loop {
            let value = self.parse_expression();
            let after = if self.optional(Kind::KwAfter) {
                self.parse_expression()
            } else {
                None
            };
            if value.is_some() || after.is_some() {
                result.push(WaveformElement { value, after });
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }
        result
    }

    // LRM93 8.7
    //
    // if_statement ::=
    //     IF condition THEN sequence_of_statements
    //     { ELSIF condition THEN sequence_of_statements }
    //     [ ELSE sequence_of_statements ]
    //     END IF [ IF_label ] ;
    //
    // The elsif/else chain is encoded as a singly-linked tail of
    // [`IfStatement`] nodes.
    fn parse_if_statement(&mut self) -> Option<IfStatement> {
        let if_kw = self.eat(Kind::KwIf);

        let condition = self.parse_expression();

        let then_kw = self.eat(Kind::KwThen);

        let then_stmts = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let otherwise = self.parse_if_chain_tail()?;

        if otherwise.is_none() {
            self.close_if_statement();
        }

        Some(IfStatement {
            if_kw,
            condition,
            then_kw,
            then_stmts,
            otherwise,
        })
    }

    /// The elsif/else continuation of an if chain, as a boxed link; `None`
    /// inside `Some` means the chain ends here and the caller must consume
    /// the shared `end if ;` closure.
    #[allow(clippy::option_option)]
    fn parse_if_chain_tail(&mut self) -> Option<Option<Box<SequentialStatement>>> {
        match self.current() {
            Kind::KwElsif => {
                let link_first = self.lexer.current_location();
                self.skip();
                let link = self.parse_elsif_tail(link_first)?;
                Some(Some(Box::new(link)))
            }
            Kind::KwElse => {
                let link_first = self.lexer.current_location();
                let else_kw = self.eat(Kind::KwElse);
                let stmts = self.parse_many(ParseState::SequentialStatements, |p| {
                    p.parse_sequential_statement()
                });
                // the final link owns the chain's closure
                self.close_if_statement();
                Some(Some(Box::new(SequentialStatement {
                    span: link_first.span_to(self.lexer.previous_location()),
                    label: None,
                    kind: SeqStmt::If(IfStatement {
                        if_kw: else_kw,
                        condition: None,
                        then_kw: else_kw,
                        then_stmts: stmts,
                        otherwise: None,
                    }),
                })))
            }
            _ => Some(None),
        }
    }

    fn close_if_statement(&mut self) {
        self.consume(Kind::KwEnd);
        self.consume(Kind::KwIf);
        if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);
    }

    // after an ELSIF keyword: condition THEN ... and whatever follows
    fn parse_elsif_tail(&mut self, first: vhdlsense_base::Location) -> Option<SequentialStatement> {
        let condition = self.parse_expression();
        let then_kw = self.eat(Kind::KwThen);
        let then_stmts = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let otherwise = self.parse_if_chain_tail()?;

        if otherwise.is_none() {
            self.close_if_statement();
        }

        Some(SequentialStatement {
            span: first.span_to(self.lexer.previous_location()),
            label: None,
            kind: SeqStmt::If(IfStatement {
                if_kw: first,
                condition,
                then_kw,
                then_stmts,
                otherwise,
            }),
        })
    }

    // parameter_specification ::= identifier IN discrete_range
    pub(crate) fn parse_parameter_specification(&mut self) -> Option<ParameterSpec> {
        let (identifier, valid) = self.parse_identifier(PARAM_SPEC_EXPECTING_IDENT);
        self.consume(Kind::KwIn);
        let range = self.parse_discrete_range()?;
        valid.then_some(ParameterSpec { identifier, range })
    }

    // LRM93 8.9 loop statements
    fn parse_for_loop_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwFor);

        let parameter = self.parse_parameter_specification();

        let loop_kw = self.eat(Kind::KwLoop);

        let body = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwLoop);
        if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);

        Some(SeqStmt::ForLoop {
            parameter: parameter?,
            loop_kw,
            body,
            end_kw,
        })
    }

    fn parse_while_loop_statement(&mut self) -> Option<SeqStmt> {
        let condition = if self.optional(Kind::KwWhile) {
            self.parse_expression()
        } else {
            None
        };

        let loop_kw = self.eat(Kind::KwLoop);

        let body = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwLoop);
        if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);

        Some(SeqStmt::WhileLoop { condition, loop_kw, body, end_kw })
    }

    // LRM93 8.8
    //
    // case_statement ::=
    //     CASE expression IS
    //         case_statement_alternative
    //         { case_statement_alternative }
    //     END CASE [ CASE_label ] ;
    fn parse_case_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwCase);

        let expression = self.parse_expression();

        let is_kw = self.eat(Kind::KwIs);

        let mut alternatives = Vec::new();
        while self.current() == Kind::KwWhen {
            let when_kw = self.eat(Kind::KwWhen);
            let choices = self.parse_choices();
            self.consume(Kind::RightArrow);
            let stmts = self.parse_many(ParseState::SequentialStatements, |p| {
                p.parse_sequential_statement()
            });
            alternatives.push(CaseAlternative { when_kw, choices, stmts });
        }

        if alternatives.is_empty() {
            self.diag(CASE_MISSING_ALTERNATIVE);
        }

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwCase);
        if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);

        Some(SeqStmt::Case {
            expression: expression?,
            is_kw,
            alternatives,
            end_kw,
        })
    }

    fn parse_next_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwNext);

        let label = if self.current() == Kind::Identifier {
            let t = self.lexer.current_token();
            self.skip();
            Some(t)
        } else {
            None
        };

        let when = if self.optional(Kind::KwWhen) {
            self.parse_expression()
        } else {
            None
        };

        self.consume(Kind::Semicolon);
        Some(SeqStmt::Next { label, when })
    }

    fn parse_exit_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwExit);

        let label = if self.current() == Kind::Identifier {
            let t = self.lexer.current_token();
            self.skip();
            Some(t)
        } else {
            None
        };

        let when = if self.optional(Kind::KwWhen) {
            self.parse_expression()
        } else {
            None
        };

        self.consume(Kind::Semicolon);
        Some(SeqStmt::Exit { label, when })
    }

    fn parse_return_statement(&mut self) -> Option<SeqStmt> {
        self.consume(Kind::KwReturn);

        let expression = if self.current() != Kind::Semicolon {
            self.parse_expression()
        } else {
            None
        };

        self.consume(Kind::Semicolon);
        Some(SeqStmt::Return { expression })
    }

    // ------------------------------------------------------------------------
    // Concurrent statements (LRM93 9.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_concurrent_statement(&mut self) -> Option<ConcurrentStatement> {
        let has_label = self.peek(0) == Kind::Identifier && self.peek(1) == Kind::Colon;
        let first_kind = self.peek(if has_label { 2 } else { 0 });
        let second_kind = self.peek(if has_label { 3 } else { 1 });

        let first = self.lexer.current_location();

        let assignment_ahead = {
            let params = LookParams {
                look: [Kind::Lte, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                stop: [Kind::Semicolon, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                abort: Kind::Invalid,
                nest_in: Kind::LeftPar,
                nest_out: Kind::RightPar,
                depth: 0,
            };
            self.lexer.look_for(&params)
        };

        let mut postponed = false;

        let (label, kind) = match first_kind {
            Kind::Identifier => {
                if has_label
                    && matches!(second_kind, Kind::Semicolon | Kind::KwGeneric | Kind::KwPort)
                {
                    self.parse_component_instantiation()
                } else if assignment_ahead {
                    self.parse_concurrent_signal_assignment()
                } else {
                    self.parse_concurrent_procedure_call()
                }
            }
            Kind::KwProcess => self.parse_process_statement(false),
            Kind::KwComponent | Kind::KwEntity | Kind::KwConfiguration => {
                self.parse_component_instantiation()
            }
            Kind::KwWith => self.parse_concurrent_signal_assignment(),
            Kind::KwAssert => self.parse_concurrent_assertion(),
            Kind::KwPostponed => {
                postponed = true;
                if second_kind == Kind::KwAssert {
                    self.parse_concurrent_assertion()
                } else {
                    self.parse_process_statement(true)
                }
            }
            Kind::KwBlock => self.parse_block_statement(),
            Kind::KwIf | Kind::KwFor => self.parse_generate_statement(),
            Kind::LeftPar => self.parse_concurrent_signal_assignment(),
            _ => (None, None),
        };

        let kind = kind?;
        Some(ConcurrentStatement {
            span: first.span_to(self.lexer.previous_location()),
            label,
            postponed,
            kind,
        })
    }

    /// Entity statements: only passive processes, assertions and procedure
    /// calls are legal.
    pub(crate) fn parse_entity_statement(&mut self) -> Option<ConcurrentStatement> {
        let has_label = self.peek(0) == Kind::Identifier && self.peek(1) == Kind::Colon;
        let first_kind = self.peek(if has_label { 2 } else { 0 });
        let second_kind = self.peek(if has_label { 3 } else { 1 });

        let first = self.lexer.current_location();

        let mut postponed = false;
        let (label, kind) = match first_kind {
            Kind::KwProcess => self.parse_process_statement(false),
            Kind::KwAssert => self.parse_concurrent_assertion(),
            Kind::KwPostponed => {
                postponed = true;
                if second_kind == Kind::KwAssert {
                    self.parse_concurrent_assertion()
                } else {
                    self.parse_process_statement(true)
                }
            }
            Kind::Identifier => self.parse_concurrent_procedure_call(),
            _ => (None, None),
        };

        let kind = kind?;
        Some(ConcurrentStatement {
            span: first.span_to(self.lexer.previous_location()),
            label,
            postponed,
            kind,
        })
    }

    // LRM93 9.2
    //
    // process_statement ::=
    //     [ PROCESS_label : ] [ POSTPONED ] PROCESS [ ( sensitivity_list ) ] [ IS ]
    //         process_declarative_part
    //     BEGIN
    //         process_statement_part
    //     END [ POSTPONED ] PROCESS [ PROCESS_label ] ;
    fn parse_process_statement(&mut self, postponed: bool) -> (Option<Token>, Option<ConcStmt>) {
        let label = self.parse_optional_label();

        if postponed {
            self.consume(Kind::KwPostponed);
        }

        let process_kw = self.eat(Kind::KwProcess);

        let mut sensitivity = Vec::new();
        if self.optional(Kind::LeftPar) {
            loop {
                if let Some(n) = self.parse_name() {
                    sensitivity.push(n);
                }
                if !self.optional(Kind::Comma) {
                    break;
                }
            }
            self.consume(Kind::RightPar);
        }

        if self.optional(Kind::KwIs) && self.version < Version::Vhdl93 {
            self.diag(IS_NOT_ALLOWED_IN_VHDL87);
        }

        let decls = self.parse_many(ParseState::DeclarativePartBegin, |p| {
            p.parse_declarative_item(DeclarativePart::Process)
        });

        let begin_kw = self.eat(Kind::KwBegin);

        let stmts = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        self.optional(Kind::KwPostponed);
        self.consume(Kind::KwProcess);
        if let Some(label) = label {
            self.parse_optional_closing_label(label);
        } else if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);

        (
            label,
            Some(ConcStmt::Process(ProcessStatement {
                process_kw,
                sensitivity,
                decls,
                begin_kw,
                stmts,
                end_kw,
                region: None,
            })),
        )
    }

    // LRM93 9.4
    fn parse_concurrent_assertion(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let label = self.parse_optional_label();
        self.optional(Kind::KwPostponed);

        match self.parse_assertion_tail() {
            Some((condition, report, severity)) => (
                label,
                Some(ConcStmt::Assertion { condition, report, severity }),
            ),
            None => (label, None),
        }
    }

    // LRM93 9.3
    fn parse_concurrent_procedure_call(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let label = self.parse_optional_label();
        self.optional(Kind::KwPostponed);

        let procedure = self.parse_name();
        self.consume(Kind::Semicolon);

        match procedure {
            Some(procedure) => (label, Some(ConcStmt::ProcedureCall { procedure })),
            None => (label, None),
        }
    }

    // LRM93 9.5
    //
    // concurrent_signal_assignment_statement ::=
    //     [ label : ] [ POSTPONED ] conditional_signal_assignment
    //   | [ label : ] [ POSTPONED ] selected_signal_assignment
    fn parse_concurrent_signal_assignment(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let label = self.parse_optional_label();
        self.optional(Kind::KwPostponed);

        if self.optional(Kind::KwWith) {
            // with expression select target <= options selected_waveforms ;
            let with_expr = self.parse_expression();
            self.consume(Kind::KwSelect);

            let target = self.parse_target();
            self.consume(Kind::Lte);

            let guarded = self.optional(Kind::KwGuarded);
            let delay = self.parse_delay_mechanism();

            let mut waveforms = Vec::new();
            loop {
                let wave = self.parse_waveform();
                self.consume(Kind::KwWhen);
                let choices = self.parse_choices();
                waveforms.push(SelectedWaveform { waveforms: wave, choices });
                if !self.optional(Kind::Comma) {
                    break;
                }
            }

            self.consume(Kind::Semicolon);

            let (Some(with_expr), Some(target)) = (with_expr, target) else {
                return (label, None);
            };
            return (
                label,
                Some(ConcStmt::SelAssign {
                    with_expr,
                    target,
                    guarded,
                    delay,
                    waveforms,
                }),
            );
        }

        // conditional: target <= options waveform { when cond else waveform }
        let target = self.parse_target();
        self.consume(Kind::Lte);

        let guarded = self.optional(Kind::KwGuarded);
        let delay = self.parse_delay_mechanism();

        let mut waveforms = Vec::new();
        loop {
            let wave = self.parse_waveform();
            if self.optional(Kind::KwWhen) {
                let when = self.parse_expression();
                waveforms.push(ConditionalWaveform { waveforms: wave, when });
                if self.optional(Kind::KwElse) {
                    continue;
                }
                break;
            }
            waveforms.push(ConditionalWaveform { waveforms: wave, when: None });
            break;
        }

        self.consume(Kind::Semicolon);

        match target {
            Some(target) => (
                label,
                Some(ConcStmt::CondAssign { target, guarded, delay, waveforms }),
            ),
            None => (label, None),
        }
    }

    // LRM93 9.6
    //
    // component_instantiation_statement ::=
    //     INSTANTIATION_label : instantiated_unit
    //         [ generic_map_aspect ] [ port_map_aspect ] ;
    fn parse_component_instantiation(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let (label, valid) = self.parse_non_optional_label(INST_LABEL);

        let unit = match self.current() {
            Kind::KwComponent => {
                self.consume(Kind::KwComponent);
                self.parse_name().map(|n| InstantiatedUnit::Component(Box::new(n)))
            }
            Kind::KwEntity => {
                self.consume(Kind::KwEntity);
                let name = self.parse_name_with(NameOptions {
                    allow_qifts: false,
                    ..NameOptions::default()
                });
                let mut architecture = None;
                if self.optional(Kind::LeftPar) {
                    if self.current() == Kind::Identifier {
                        architecture = Some(self.lexer.current_token());
                        self.skip();
                    }
                    self.consume(Kind::RightPar);
                }
                name.map(|n| InstantiatedUnit::Entity { name: Box::new(n), architecture })
            }
            Kind::KwConfiguration => {
                self.consume(Kind::KwConfiguration);
                self.parse_name().map(|n| InstantiatedUnit::Configuration(Box::new(n)))
            }
            _ => self.parse_name().map(|n| InstantiatedUnit::Component(Box::new(n))),
        };

        let mut generic_map_kw = None;
        let mut generic_map = Vec::new();
        if self.current() == Kind::KwGeneric {
            generic_map_kw = Some(self.eat(Kind::KwGeneric));
            self.consume(Kind::KwMap);
            self.consume(Kind::LeftPar);
            generic_map = self.parse_association_list();
            self.consume(Kind::RightPar);
        }

        let mut port_map_kw = None;
        let mut port_map = Vec::new();
        if self.current() == Kind::KwPort {
            port_map_kw = Some(self.eat(Kind::KwPort));
            self.consume(Kind::KwMap);
            self.consume(Kind::LeftPar);
            port_map = self.parse_association_list();
            self.consume(Kind::RightPar);
        }

        self.consume(Kind::Semicolon);

        let Some(unit) = unit else {
            return (label, None);
        };
        if !valid {
            return (label, None);
        }

        (
            label,
            Some(ConcStmt::Instantiation(ComponentInstantiation {
                unit,
                generic_map_kw,
                generic_map,
                port_map_kw,
                port_map,
                region: None,
            })),
        )
    }

    // LRM93 9.7
    //
    // generate_statement ::=
    //     GENERATE_label : generation_scheme GENERATE
    //         [ { block_declarative_item } BEGIN ]
    //         { concurrent_statement }
    //     END GENERATE [ GENERATE_label ] ;
    fn parse_generate_statement(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let (label, valid) = self.parse_non_optional_label(GENERATE_LABEL);

        let kind = match self.current() {
            Kind::KwFor => {
                self.consume(Kind::KwFor);
                let parameter = self.parse_parameter_specification();
                let generate_kw = self.eat(Kind::KwGenerate);
                let (decls, begin_kw, stmts, end_kw) = self.parse_generate_body();

                parameter.map(|parameter| {
                    ConcStmt::ForGenerate(ForGenerate {
                        parameter,
                        generate_kw,
                        decls,
                        begin_kw,
                        stmts,
                        end_kw,
                        region: None,
                    })
                })
            }
            Kind::KwIf => {
                self.consume(Kind::KwIf);
                let condition = self.parse_expression();
                let generate_kw = self.eat(Kind::KwGenerate);
                let (decls, begin_kw, stmts, end_kw) = self.parse_generate_body();

                condition.map(|condition| {
                    ConcStmt::IfGenerate(IfGenerate {
                        condition,
                        generate_kw,
                        decls,
                        begin_kw,
                        stmts,
                        end_kw,
                        region: None,
                    })
                })
            }
            _ => None,
        };

        if !valid {
            return (label, None);
        }
        (label, kind)
    }

    fn parse_generate_body(
        &mut self,
    ) -> (
        Vec<DeclarativeItem>,
        Option<vhdlsense_base::Location>,
        Vec<ConcurrentStatement>,
        vhdlsense_base::Location,
    ) {
        // declarations are only allowed when followed by an explicit begin
        let mut decls = Vec::new();
        let mut begin_kw = None;
        if matches!(
            self.current(),
            Kind::KwType
                | Kind::KwSubtype
                | Kind::KwSignal
                | Kind::KwConstant
                | Kind::KwVariable
                | Kind::KwShared
                | Kind::KwFile
                | Kind::KwAlias
                | Kind::KwComponent
                | Kind::KwAttribute
                | Kind::KwUse
                | Kind::KwFunction
                | Kind::KwProcedure
                | Kind::KwPure
                | Kind::KwImpure
                | Kind::KwBegin
        ) {
            decls = self.parse_many(ParseState::DeclarativePartBegin, |p| {
                p.parse_declarative_item(DeclarativePart::Block)
            });
            begin_kw = Some(self.eat(Kind::KwBegin));
        }

        let stmts = self.parse_many(ParseState::ConcurrentStatements, |p| {
            p.parse_concurrent_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwGenerate);
        if self.current() == Kind::Identifier {
            self.skip();
        }
        self.consume(Kind::Semicolon);

        (decls, begin_kw, stmts, end_kw)
    }

    // LRM93 9.1
    fn parse_block_statement(&mut self) -> (Option<Token>, Option<ConcStmt>) {
        let (label, valid) = self.parse_non_optional_label(BLOCK_LABEL);

        let block_kw = self.eat(Kind::KwBlock);

        let guard = if self.optional(Kind::LeftPar) {
            let g = self.parse_expression();
            self.consume_msg(Kind::RightPar, BLOCK_GUARD);
            g
        } else {
            None
        };

        if self.optional(Kind::KwIs) && self.version < Version::Vhdl93 {
            self.diag(IS_NOT_ALLOWED_IN_VHDL87);
        }

        let mut generics = None;
        let mut generic_map = Vec::new();
        if self.current() == Kind::KwGeneric {
            generics = Some(self.parse_generic_clause());
            if self.current() == Kind::KwGeneric {
                self.consume(Kind::KwGeneric);
                self.consume(Kind::KwMap);
                self.consume(Kind::LeftPar);
                generic_map = self.parse_association_list();
                self.consume(Kind::RightPar);
                self.consume(Kind::Semicolon);
            }
        }

        let mut ports = None;
        let mut port_map = Vec::new();
        if self.current() == Kind::KwPort {
            ports = Some(self.parse_port_clause());
            if self.current() == Kind::KwPort {
                self.consume(Kind::KwPort);
                self.consume(Kind::KwMap);
                self.consume(Kind::LeftPar);
                port_map = self.parse_association_list();
                self.consume(Kind::RightPar);
                self.consume(Kind::Semicolon);
            }
        }

        let decls = self.parse_many(ParseState::DeclarativePartBegin, |p| {
            p.parse_declarative_item(DeclarativePart::Block)
        });

        let begin_kw = self.eat(Kind::KwBegin);

        let stmts = self.parse_many(ParseState::ConcurrentStatements, |p| {
            p.parse_concurrent_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwBlock);
        if let Some(label) = label {
            self.parse_optional_closing_label(label);
        }
        self.consume(Kind::Semicolon);

        if !valid {
            return (label, None);
        }

        (
            label,
            Some(ConcStmt::Block(BlockStatement {
                block_kw,
                guard,
                generics,
                generic_map,
                ports,
                port_map,
                decls,
                begin_kw,
                stmts,
                end_kw,
            })),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::syntax::*;
    use crate::token::Version;
    use vhdlsense_base::StringTable;

    fn parse(src: &str) -> (Vec<DesignUnit>, Vec<vhdlsense_base::Diagnostic>) {
        let mut st = StringTable::new();
        let parser = Parser::new(src.as_bytes(), &mut st, "test.vhd", Version::Vhdl93);
        parser.parse()
    }

    fn arch_stmts(body: &str) -> Vec<ConcurrentStatement> {
        let src = format!("architecture a of e is\nbegin\n{body}\nend architecture;");
        let (mut units, diags) = parse(&src);
        assert!(diags.is_empty(), "{body}: {diags:?}");
        match units.remove(0).kind {
            DesignUnitKind::Architecture(a) => a.stmts,
            other => panic!("{other:?}"),
        }
    }

    fn process_stmts(body: &str) -> Vec<SequentialStatement> {
        let mut stmts = arch_stmts(&format!("process begin\n{body}\nend process;"));
        match stmts.remove(0).kind {
            ConcStmt::Process(p) => p.stmts,
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn signal_assignment_with_waveform() {
        let stmts = process_stmts("q <= '1' after 10 ns;");
        let SeqStmt::SignalAssign { waveforms, .. } = &stmts[0].kind else {
            panic!("{:?}", stmts[0].kind)
        };
        assert_eq!(waveforms.len(), 1);
        assert!(waveforms[0].after.is_some());
    }

    #[test]
    fn variable_assignment() {
        let stmts = process_stmts("v := v + 1;");
        assert!(matches!(stmts[0].kind, SeqStmt::VariableAssign { .. }));
    }

    #[test]
    fn procedure_call_statement() {
        let stmts = process_stmts("do_thing(a, b);");
        assert!(matches!(stmts[0].kind, SeqStmt::ProcedureCall { .. }));
    }

    #[test]
    fn wait_statement_clauses() {
        let stmts = process_stmts("wait on clk until rst = '0' for 10 ns;");
        let SeqStmt::Wait { on, until, timeout } = &stmts[0].kind else { panic!() };
        assert_eq!(on.len(), 1);
        assert!(until.is_some());
        assert!(timeout.is_some());
    }

    #[test]
    fn if_elsif_else_chain_is_singly_linked() {
        let stmts = process_stmts(
            "if a then q <= '0'; elsif b then q <= '1'; else q <= '0'; end if;",
        );
        let SeqStmt::If(chain) = &stmts[0].kind else { panic!() };
        assert!(chain.condition.is_some());

        let elsif = chain.otherwise.as_ref().expect("elsif link");
        let SeqStmt::If(elsif) = &elsif.kind else { panic!() };
        assert!(elsif.condition.is_some());

        let else_link = elsif.otherwise.as_ref().expect("else link");
        let SeqStmt::If(else_link) = &else_link.kind else { panic!() };
        assert!(else_link.condition.is_none());
        assert!(else_link.otherwise.is_none());
    }

    #[test]
    fn case_statement_with_alternatives() {
        let stmts = process_stmts(
            "case sel is when '0' => q <= a; when others => q <= b; end case;",
        );
        let SeqStmt::Case { alternatives, .. } = &stmts[0].kind else { panic!() };
        assert_eq!(alternatives.len(), 2);
    }

    #[test]
    fn case_without_alternatives_diagnoses() {
        let src = "architecture a of e is begin process begin case sel is end case; end process; end architecture;";
        let (_, diags) = parse(src);
        assert!(diags.iter().any(|d| d.message().contains("alternative")));
    }

    #[test]
    fn for_loop_with_parameter() {
        let stmts = process_stmts("for i in 0 to 7 loop q <= a; end loop;");
        let SeqStmt::ForLoop { body, .. } = &stmts[0].kind else { panic!() };
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn plain_and_while_loops() {
        let stmts = process_stmts("loop exit when done; end loop;");
        let SeqStmt::WhileLoop { condition, body, .. } = &stmts[0].kind else { panic!() };
        assert!(condition.is_none());
        assert!(matches!(body[0].kind, SeqStmt::Exit { .. }));
    }

    #[test]
    fn process_with_sensitivity_list() {
        let stmts = arch_stmts("process (clk, rst) begin end process;");
        let ConcStmt::Process(p) = &stmts[0].kind else { panic!() };
        assert_eq!(p.sensitivity.len(), 2);
    }

    #[test]
    fn labelled_process_keeps_label() {
        let stmts = arch_stmts("main : process begin end process main;");
        assert!(stmts[0].label.is_some());
    }

    #[test]
    fn concurrent_conditional_assignment() {
        let stmts = arch_stmts("q <= a when sel = '0' else b;");
        let ConcStmt::CondAssign { waveforms, .. } = &stmts[0].kind else {
            panic!("{:?}", stmts[0].kind)
        };
        assert_eq!(waveforms.len(), 2);
        assert!(waveforms[0].when.is_some());
        assert!(waveforms[1].when.is_none());
    }

    #[test]
    fn selected_signal_assignment() {
        let stmts = arch_stmts("with sel select q <= a when '0', b when others;");
        let ConcStmt::SelAssign { waveforms, .. } = &stmts[0].kind else { panic!() };
        assert_eq!(waveforms.len(), 2);
    }

    #[test]
    fn component_instantiation_with_port_map() {
        let stmts = arch_stmts("u0 : andgate port map ( x => a, y => b, z => q );");
        let ConcStmt::Instantiation(inst) = &stmts[0].kind else {
            panic!("{:?}", stmts[0].kind)
        };
        assert_eq!(inst.port_map.len(), 3);
        assert!(matches!(inst.unit, InstantiatedUnit::Component(_)));
    }

    #[test]
    fn direct_entity_instantiation() {
        let stmts = arch_stmts("u0 : entity work.andgate(rtl) port map ( x => a );");
        let ConcStmt::Instantiation(inst) = &stmts[0].kind else { panic!() };
        let InstantiatedUnit::Entity { architecture, .. } = &inst.unit else { panic!() };
        assert!(architecture.is_some());
    }

    #[test]
    fn for_generate_statement() {
        let stmts = arch_stmts("gen : for i in 0 to 3 generate q(i) <= a(i); end generate;");
        let ConcStmt::ForGenerate(gen) = &stmts[0].kind else { panic!() };
        assert_eq!(gen.stmts.len(), 1);
    }

    #[test]
    fn if_generate_with_declarations() {
        let stmts = arch_stmts(
            "gen : if width > 1 generate signal t : bit; begin q <= t; end generate;",
        );
        let ConcStmt::IfGenerate(gen) = &stmts[0].kind else { panic!() };
        assert_eq!(gen.decls.len(), 1);
        assert!(gen.begin_kw.is_some());
    }

    #[test]
    fn generate_without_label_diagnoses() {
        let src =
            "architecture a of e is begin for i in 0 to 3 generate end generate; end architecture;";
        let (_, diags) = parse(src);
        assert!(diags.iter().any(|d| d.message().contains("label")));
    }

    #[test]
    fn concurrent_assertion_statement() {
        let stmts = arch_stmts("assert a = b report \"mismatch\" severity error;");
        let ConcStmt::Assertion { report, severity, .. } = &stmts[0].kind else { panic!() };
        assert!(report.is_some());
        assert!(severity.is_some());
    }

    #[test]
    fn block_statement_parses() {
        let stmts = arch_stmts("b0 : block begin q <= a; end block b0;");
        let ConcStmt::Block(b) = &stmts[0].kind else { panic!() };
        assert_eq!(b.stmts.len(), 1);
    }
}
