//! Design units, declarations and type definitions.

use super::{NameOptions, ParseState, Parser};
use crate::syntax::*;
use crate::token::{Kind, Token, Version};

const EXPECTED_ENTITY_NAME: &str = "Expected entity name";
const EXPECTED_ARCHITECTURE_NAME: &str = "Expected architecture name";
const EXPECTED_PACKAGE_NAME: &str = "Expected package name";
const EXPECTED_CONFIGURATION_NAME: &str = "Expected configuration name";
const EXPECTED_TYPE_NAME: &str = "Expected type name";
const EXPECTED_SUBTYPE_NAME: &str = "Expected type name";
const EXPECTED_COMPONENT_IDENTIFIER: &str = "Expected component identifier";
const EXPECTED_COMPONENT_NAME: &str = "Expected component name";
const EXPECTED_ATTRIBUTE_IDENTIFIER: &str = "Expected attribute identifier";
const EXPECTED_ALIAS_DESIGNATOR: &str = "Expected alias designator";
const EXPECTED_IDENT_OR_CHAR: &str = "identifier or character expected";
const EXPECTED_ENTITY_ASPECT: &str = "expected 'entity', 'configuration' or 'open'";
const EXPECTED_INSTANTIATION_LIST: &str = "Expected instantiation list";
const EXPECTED_SCALAR_TYPE_DEFN: &str = "Expected a scalar type definition";
const EXPECTED_COMPOSITE_TYPE_DEFN: &str = "Expected a composite type definition";
const EXPECTED_PRIMARY_UNIT: &str = "Physical literal expects a primary unit";
const EXPECTED_SECONDARY_UNIT: &str = "Physical literal expects a secondary unit";
const EXPECTED_TO_DOWNTO: &str = "Expecting keyowrd 'to' or 'downto'";
const EXPECTING_TYPE_DEF: &str = "Expecting a type definition";
const EXPECTING_SUBPROGRAM_SPEC: &str = "This is not a subprogram specification";
const EXPECTING_SPRGM_DESIGNATOR: &str = "Expecting subprogram designator";
const MALFORMED_FUNCTION: &str = "malformed function";
const MALFORMED_PROCEDURE: &str = "malformed procedure";
const RETURN_IN_FUNC: &str = "Return is expected in a function";
const NO_RETURN_IN_PROC: &str = "Return is not allowed in a procedure";
const PURE_BEFORE_FUNCTION: &str = "'pure' must preceed 'function'";
const IMPURE_BEFORE_FUNCTION: &str = "'impure' must preceed 'function'";
const END_ARCHITECTURE_VHDL87: &str = "Keyword not allowed in vhdl87";
const END_CONFIG_KEYWORD_VHDL87: &str = "'configuration' keyword not allowed in vhdl87";
const END_PACKAGE_KEYWORD_VHDL87: &str = "'package' keyword not allowed in vhdl87";
const NESTED_PACKAGE_VHDL08: &str = "Nested package is not allowed before vhdl08";
const NO_PACKBODY_IN_PACK: &str = "package body not allowed in a package";
const NO_ATTR_IN_CFG: &str = "Attribute not allowed in a configuration";
const COLON_IN_ATTR_SPEC: &str = "use keyword of after attribute identifier";
const NO_SIG_IN_SUBPROGRAM: &str = "Signal not allowed in a subprogram";
const NO_SIG_IN_PACKBODY: &str = "Signal not allowed in a package body";
const NO_SIG_IN_PROCESS: &str = "Signal not allowed in a process";
const NO_NSVAR_IN_ENTITY: &str = "Non-shared variable not allowed in an entity";
const NO_NSVAR_IN_BLOCK: &str = "Non-shared variable not allowed in a block";
const NO_NSVAR_IN_PACKAGE: &str = "Non-shared variable not allowed in a package";
const NO_NSVAR_IN_PACKBODY: &str = "Non-shared variable not allowed in a package body";
const NO_SVAR_IN_VHDL87: &str = "Shared variables not allowed in vhdl87";
const NO_SVAR_IN_SUBPROGRAM: &str = "Shared variable not allowed in a subprogram";
const NO_SVAR_IN_PROCESS: &str = "Shared variable not allowed in a process";
const NO_COMPONENT_IN_ENTITY: &str = "Component is not allowed in an entity";
const NO_COMPONENT_IN_SUBPROGRAM: &str = "Component is not allowed in a subprogram";
const NO_COMPONENT_IN_PACKBODY: &str = "Component is not allowed in a package body";
const NO_COMPONENT_IN_PROCESS: &str = "Component is not allowed in a process";
const NO_CFG_SPEC_IN_ENTITY: &str = "Configuration specification not allowed in an entity";
const NO_CFG_SPEC_IN_SUBPROGRAM: &str = "Configuration specification not allowed in a subprogram";
const NO_CFG_SPEC_IN_PACKBODY: &str = "Configuration specification not allowed in a package body";
const NO_CFG_SPEC_IN_PROCESS: &str = "Configuration specification not allowed in a process";
const NO_FUNCTION_BODY_IN_PACKAGE: &str = "Function body is not allowed in a package";
const NO_PROCEDURE_BODY_IN_PACKAGE: &str = "Procedure body is not allowed in a package";
const EXPECTED_OBJECT_CLASS: &str = "A class such as a variable, signal or constant is expected";
const NO_CONSTANT_IN_PORT: &str = "constant interface not allowed in port";
const NO_SIGNAL_IN_GENERIC: &str = "signal interface not allowed in generic";
const NO_VARIABLE_IN_GENERIC: &str = "variable interface not allowed in generic";
const NO_VARIABLE_IN_PORT: &str = "variable interface not allowed in port";
const NO_FILE_IN_GENERIC: &str = "file interface not allowed in generic";
const NO_FILE_IN_PORT: &str = "file interface not allowed in port";
const NO_FILE_IN_VHDL87: &str = "file interface not allowed in vhdl87";
const PACKAGE_ONLY_IN_VHDL08: &str = "package interface only allowed in vhdl08";
const PACKAGE_ONLY_IN_GENERIC: &str = "package interface only allowed in generic";
const TYPE_ONLY_IN_VHDL08: &str = "type interface only allowed in vhdl08";
const TYPE_ONLY_IN_GENERIC: &str = "type interface only allowed in generic";
const SUBPROGRAM_ONLY_IN_VHDL08: &str = "subprogram interface only allowed in vhdl08";
const SUBPROGRAM_ONLY_IN_GENERIC: &str = "subprogram interface only allowed in generic";
const OPEN_FILE_VHDL87: &str = "open kind expressions not allowed in vhdl87";
const FILE_NAME_VHDL87: &str = "file name expected in vhdl87";
const FILE_MODE_VHDL87: &str = "mode is only allowed in vhdl87";
const WRONG_FILE_MODE: &str = "This mode is not allowed in a file declaration";
const INDEX_CONSTRAINT_NOT_ALLOWED: &str = "index constraint not allowed";
const EMPTY_ASSOC_LIST: &str = "Empty association list";

/// Which declarative part is being parsed; gates the class checks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum DeclarativePart {
    Entity,
    Block,
    Package,
    PackageBody,
    Process,
    Subprogram,
    Configuration,
}

/// Which interface list is being parsed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum InterfaceList {
    Generic,
    Port,
    Function,
    Procedure,
}

impl<'src, 'st> Parser<'src, 'st> {
    // ------------------------------------------------------------------------
    // Design entities and configurations (LRM93 1.0)
    // ------------------------------------------------------------------------

    // LRM93 1.1
    //
    // entity_declaration ::=
    //     ENTITY identifier IS
    //         entity_header
    //         entity_declarative_part
    //     [ BEGIN entity_statement_part ]
    //     END [ ENTITY ] [ ENTITY_simple_name ] ;
    pub(crate) fn parse_entity_declaration(&mut self) -> Option<DesignUnit> {
        let first = self.eat(Kind::KwEntity);

        let (identifier, valid) = self.parse_identifier(EXPECTED_ENTITY_NAME);

        let is_kw = self.eat(Kind::KwIs);

        let generics = if self.current() == Kind::KwGeneric {
            Some(self.parse_generic_clause())
        } else {
            None
        };

        let ports = if self.current() == Kind::KwPort {
            Some(self.parse_port_clause())
        } else {
            None
        };

        let decls = self.parse_many(ParseState::DeclarativePartBeginEnd, |p| {
            p.parse_declarative_item(DeclarativePart::Entity)
        });

        let mut begin_kw = None;
        let mut stmts = Vec::new();
        if self.current() == Kind::KwBegin {
            begin_kw = Some(self.eat(Kind::KwBegin));
            stmts = self.parse_many(ParseState::EntityStatementPart, |p| {
                p.parse_entity_statement()
            });
        }

        let end_kw = self.eat(Kind::KwEnd);
        if self.optional(Kind::KwEntity) && self.version < Version::Vhdl93 {
            self.diag(END_ARCHITECTURE_VHDL87);
        }
        self.parse_optional_closing_label(identifier);
        let last = self.eat(Kind::Semicolon);

        if !valid {
            return None;
        }

        Some(DesignUnit {
            span: first.span_to(last),
            contexts: Vec::new(),
            kind: DesignUnitKind::Entity(EntityDecl {
                identifier,
                is_kw,
                generics,
                ports,
                decls,
                begin_kw,
                stmts,
                end_kw,
                region: None,
            }),
        })
    }

    // LRM93 1.1.1
    //
    // generic_clause ::= GENERIC ( generic_list ) ;
    pub(crate) fn parse_generic_clause(&mut self) -> InterfaceClause {
        let kw = self.eat(Kind::KwGeneric);
        let lparen = self.eat(Kind::LeftPar);
        let items = self.parse_interface_list(InterfaceList::Generic);
        let rparen = self.eat(Kind::RightPar);
        self.consume(Kind::Semicolon);
        InterfaceClause { kw, lparen, items, rparen }
    }

    // LRM93 1.1.1
    //
    // port_clause ::= PORT ( port_list ) ;
    pub(crate) fn parse_port_clause(&mut self) -> InterfaceClause {
        let kw = self.eat(Kind::KwPort);
        let lparen = self.eat(Kind::LeftPar);
        let items = self.parse_interface_list(InterfaceList::Port);
        let rparen = self.eat(Kind::RightPar);
        self.consume(Kind::Semicolon);
        InterfaceClause { kw, lparen, items, rparen }
    }

    // LRM93 1.2
    //
    // architecture_body ::=
    //     ARCHITECTURE identifier OF ENTITY_name IS
    //         architecture_declarative_part
    //     BEGIN
    //         architecture_statement_part
    //     END [ ARCHITECTURE ] [ ARCHITECTURE_simple_name ] ;
    pub(crate) fn parse_architecture_body(&mut self) -> Option<DesignUnit> {
        let first = self.eat(Kind::KwArchitecture);

        let (identifier, valid) = self.parse_identifier(EXPECTED_ARCHITECTURE_NAME);

        self.consume(Kind::KwOf);

        let entity_name = self.parse_name().map(Box::new);

        let is_kw = self.eat(Kind::KwIs);

        let decls = self.parse_many(ParseState::DeclarativePartBegin, |p| {
            p.parse_declarative_item(DeclarativePart::Block)
        });

        let begin_kw = self.eat(Kind::KwBegin);

        let stmts = self.parse_many(ParseState::ConcurrentStatements, |p| {
            p.parse_concurrent_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        if self.optional(Kind::KwArchitecture) && self.version < Version::Vhdl93 {
            self.diag(END_ARCHITECTURE_VHDL87);
        }
        self.parse_optional_closing_label(identifier);
        let last = self.eat(Kind::Semicolon);

        let entity_name = entity_name?;
        if !valid {
            return None;
        }

        Some(DesignUnit {
            span: first.span_to(last),
            contexts: Vec::new(),
            kind: DesignUnitKind::Architecture(ArchitectureBody {
                identifier,
                entity_name,
                is_kw,
                decls,
                begin_kw,
                stmts,
                end_kw,
                region: None,
            }),
        })
    }

    // LRM93 2.5
    //
    // package_declaration ::=
    //     PACKAGE identifier IS
    //         package_declarative_part
    //     END [ PACKAGE ] [ PACKAGE_simple_name ] ;
    pub(crate) fn parse_package_declaration(&mut self) -> Option<DesignUnit> {
        let first = self.eat(Kind::KwPackage);

        let (identifier, valid) = self.parse_identifier(EXPECTED_PACKAGE_NAME);

        let is_kw = self.eat(Kind::KwIs);

        let decls = self.parse_many(ParseState::DeclarativePartEnd, |p| {
            p.parse_declarative_item(DeclarativePart::Package)
        });

        let end_kw = self.eat(Kind::KwEnd);
        if self.optional(Kind::KwPackage) && self.version < Version::Vhdl93 {
            self.diag(END_PACKAGE_KEYWORD_VHDL87);
        }
        self.parse_optional_closing_label(identifier);
        let last = self.eat(Kind::Semicolon);

        if !valid {
            return None;
        }

        Some(DesignUnit {
            span: first.span_to(last),
            contexts: Vec::new(),
            kind: DesignUnitKind::Package(PackageDecl {
                identifier,
                is_kw,
                decls,
                end_kw,
                region: None,
            }),
        })
    }

    // LRM93 2.6
    //
    // package_body ::=
    //     PACKAGE BODY PACKAGE_simple_name IS
    //         package_body_declarative_part
    //     END [ PACKAGE BODY ] [ PACKAGE_simple_name ] ;
    pub(crate) fn parse_package_body(&mut self) -> Option<DesignUnit> {
        let first = self.eat(Kind::KwPackage);
        self.consume(Kind::KwBody);

        let (identifier, valid) = self.parse_identifier(EXPECTED_PACKAGE_NAME);

        let is_kw = self.eat(Kind::KwIs);

        let decls = self.parse_many(ParseState::DeclarativePartEnd, |p| {
            p.parse_declarative_item(DeclarativePart::PackageBody)
        });

        let end_kw = self.eat(Kind::KwEnd);
        if self.optional(Kind::KwPackage) {
            if self.version < Version::Vhdl93 {
                self.diag(END_PACKAGE_KEYWORD_VHDL87);
            }
            self.consume(Kind::KwBody);
        }
        self.parse_optional_closing_label(identifier);
        let last = self.eat(Kind::Semicolon);

        if !valid {
            return None;
        }

        Some(DesignUnit {
            span: first.span_to(last),
            contexts: Vec::new(),
            kind: DesignUnitKind::PackageBody(PackageBody {
                identifier,
                is_kw,
                decls,
                end_kw,
                region: None,
            }),
        })
    }

    // LRM93 1.3
    //
    // configuration_declaration ::=
    //     CONFIGURATION identifier OF ENTITY_name IS
    //         configuration_declarative_part
    //         block_configuration
    //     END [ CONFIGURATION ] [ CONFIGURATION_simple_name ] ;
    pub(crate) fn parse_configuration_declaration(&mut self) -> Option<DesignUnit> {
        let first = self.eat(Kind::KwConfiguration);

        let (identifier, valid) = self.parse_identifier(EXPECTED_CONFIGURATION_NAME);

        self.consume(Kind::KwOf);

        let entity_name = self.parse_name().map(Box::new);

        let is_kw = self.eat(Kind::KwIs);

        let decls = self.parse_many(ParseState::DeclarativePartFor, |p| {
            p.parse_declarative_item(DeclarativePart::Configuration)
        });

        let block = if self.current() == Kind::KwFor {
            self.parse_block_configuration()
        } else {
            None
        };

        let end_kw = self.eat(Kind::KwEnd);
        if self.optional(Kind::KwConfiguration) && self.version < Version::Vhdl93 {
            self.diag(END_CONFIG_KEYWORD_VHDL87);
        }
        self.parse_optional_closing_label(identifier);
        let last = self.eat(Kind::Semicolon);

        let entity_name = entity_name?;
        if !valid {
            return None;
        }

        Some(DesignUnit {
            span: first.span_to(last),
            contexts: Vec::new(),
            kind: DesignUnitKind::Configuration(ConfigurationDecl {
                identifier,
                entity_name,
                is_kw,
                decls,
                block,
                end_kw,
                region: None,
            }),
        })
    }

    // LRM93 1.3.1
    //
    // block_configuration ::=
    //     FOR block_specification
    //         { use_clause }
    //         { configuration_item }
    //     END FOR ;
    pub(crate) fn parse_block_configuration(&mut self) -> Option<BlockConfiguration> {
        let for_kw = self.eat(Kind::KwFor);

        let specification = self.parse_name().map(Box::new)?;

        let mut uses = Vec::new();
        while self.current() == Kind::KwUse {
            if let Some(names) = self.parse_use_clause_names() {
                uses.push(UseClause { names });
            }
        }

        let mut items = Vec::new();
        while self.current() == Kind::KwFor {
            if let Some(item) = self.parse_configuration_item() {
                items.push(item);
            }
        }

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwFor);
        self.consume(Kind::Semicolon);

        Some(BlockConfiguration {
            for_kw,
            specification,
            uses,
            items,
            end_kw,
        })
    }

    // LRM93 1.3.1
    //
    // configuration_item ::= block_configuration | component_configuration
    //
    // Disambiguated by the second token after `for`: a component
    // configuration names instances (`label, label : comp` or `all`/`others`).
    fn parse_configuration_item(&mut self) -> Option<ConfigurationItem> {
        match self.peek(2) {
            Kind::Colon | Kind::Comma => self
                .parse_component_configuration()
                .map(ConfigurationItem::Component),
            _ => match self.peek(1) {
                Kind::KwAll | Kind::KwOthers => self
                    .parse_component_configuration()
                    .map(ConfigurationItem::Component),
                _ => self.parse_block_configuration().map(ConfigurationItem::Block),
            },
        }
    }

    // LRM93 1.3.2
    //
    // component_configuration ::=
    //     FOR component_specification
    //         [ binding_indication ; ]
    //         [ block_configuration ]
    //     END FOR ;
    fn parse_component_configuration(&mut self) -> Option<ComponentConfiguration> {
        let for_kw = self.eat(Kind::KwFor);

        let (instances, component) = self.parse_component_specification()?;

        let binding = if self.optional(Kind::KwUse) {
            let b = self.parse_binding_indication();
            self.consume(Kind::Semicolon);
            Some(b)
        } else {
            None
        };

        let block = if self.current() == Kind::KwFor {
            self.parse_block_configuration().map(Box::new)
        } else {
            None
        };

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwFor);
        self.consume(Kind::Semicolon);

        Some(ComponentConfiguration {
            for_kw,
            instances,
            component,
            binding,
            block,
            end_kw,
        })
    }

    // LRM93 5.2
    //
    // component_specification ::= instantiation_list : COMPONENT_name
    fn parse_component_specification(&mut self) -> Option<(InstantiationList, Box<Name>)> {
        let instances = match self.current() {
            Kind::KwAll => InstantiationList::All(self.eat(Kind::KwAll)),
            Kind::KwOthers => InstantiationList::Others(self.eat(Kind::KwOthers)),
            Kind::Identifier => {
                let mut labels = Vec::new();
                loop {
                    let (t, ok) = self.parse_identifier(EXPECTED_INSTANTIATION_LIST);
                    if ok {
                        labels.push(t);
                    } else {
                        break;
                    }
                    if !self.optional(Kind::Comma) {
                        break;
                    }
                }
                InstantiationList::Labels(labels)
            }
            _ => {
                self.diag(EXPECTED_INSTANTIATION_LIST);
                return None;
            }
        };

        self.consume(Kind::Colon);

        let component = self
            .parse_name_with(NameOptions { allow_qifts: false, ..NameOptions::default() })
            .map(Box::new);

        if component.is_none() {
            self.diag(EXPECTED_COMPONENT_NAME);
        }

        Some((instances, component?))
    }

    // LRM93 5.2.1
    //
    // binding_indication ::=
    //     [ USE entity_aspect ] [ generic_map_aspect ] [ port_map_aspect ]
    //
    // The leading USE has been consumed by the caller.
    fn parse_binding_indication(&mut self) -> BindingIndication {
        let aspect = self.parse_entity_aspect();

        let mut generic_map = Vec::new();
        if self.current() == Kind::KwGeneric {
            self.consume(Kind::KwGeneric);
            self.consume(Kind::KwMap);
            self.consume(Kind::LeftPar);
            generic_map = self.parse_association_list();
            self.consume(Kind::RightPar);
        }

        let mut port_map = Vec::new();
        if self.current() == Kind::KwPort {
            self.consume(Kind::KwPort);
            self.consume(Kind::KwMap);
            self.consume(Kind::LeftPar);
            port_map = self.parse_association_list();
            self.consume(Kind::RightPar);
        }

        BindingIndication { aspect, generic_map, port_map }
    }

    // LRM93 5.2.1.1
    //
    // entity_aspect ::= ENTITY ENTITY_name [ ( ARCHITECTURE_identifier ) ]
    //                 | CONFIGURATION CONFIGURATION_name
    //                 | OPEN
    fn parse_entity_aspect(&mut self) -> Option<EntityAspect> {
        match self.current() {
            Kind::KwEntity => {
                self.consume(Kind::KwEntity);
                let name = self.parse_name().map(Box::new)?;
                let mut architecture = None;
                if self.optional(Kind::LeftPar) {
                    let (t, ok) = self.parse_identifier(EXPECTED_ARCHITECTURE_NAME);
                    if ok {
                        architecture = Some(t);
                    }
                    self.consume(Kind::RightPar);
                }
                Some(EntityAspect::Entity { name, architecture })
            }
            Kind::KwConfiguration => {
                self.consume(Kind::KwConfiguration);
                let name = self.parse_name().map(Box::new)?;
                Some(EntityAspect::Configuration(name))
            }
            Kind::KwOpen => Some(EntityAspect::Open(self.eat(Kind::KwOpen))),
            _ => {
                self.diag(EXPECTED_ENTITY_ASPECT);
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Declarations (LRM93 4.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_declarative_item(
        &mut self,
        kind: DeclarativePart,
    ) -> Option<DeclarativeItem> {
        use DeclarativePart as dp;

        let first = self.lexer.current_location();

        let result: Option<DeclKind> = match self.current() {
            Kind::KwType => self.parse_type_declaration().map(DeclKind::Type),
            Kind::KwSubtype => self.parse_subtype_declaration().map(DeclKind::Subtype),
            Kind::KwSignal => {
                let not_here = match kind {
                    dp::Subprogram => Some(NO_SIG_IN_SUBPROGRAM),
                    dp::PackageBody => Some(NO_SIG_IN_PACKBODY),
                    dp::Process => Some(NO_SIG_IN_PROCESS),
                    _ => None,
                };
                let decl = self.parse_object_declaration(ObjectClass::Signal);
                match not_here {
                    Some(msg) => {
                        self.diag_at(msg, first);
                        None
                    }
                    None => decl.map(DeclKind::Object),
                }
            }
            Kind::KwConstant => self
                .parse_object_declaration(ObjectClass::Constant)
                .map(DeclKind::Object),
            Kind::KwVariable => {
                let not_here = match kind {
                    dp::Entity => Some(NO_NSVAR_IN_ENTITY),
                    dp::Block => Some(NO_NSVAR_IN_BLOCK),
                    dp::Package => Some(NO_NSVAR_IN_PACKAGE),
                    dp::PackageBody => Some(NO_NSVAR_IN_PACKBODY),
                    _ => None,
                };
                let decl = self.parse_object_declaration(ObjectClass::Variable);
                match not_here {
                    Some(msg) => {
                        self.diag_at(msg, first);
                        None
                    }
                    None => decl.map(DeclKind::Object),
                }
            }
            Kind::KwShared => {
                if self.version <= Version::Vhdl87 {
                    self.diag(NO_SVAR_IN_VHDL87);
                }
                let not_here = match kind {
                    dp::Subprogram => Some(NO_SVAR_IN_SUBPROGRAM),
                    dp::Process => Some(NO_SVAR_IN_PROCESS),
                    _ => None,
                };
                let decl = self.parse_object_declaration(ObjectClass::Variable);
                match not_here {
                    Some(msg) => {
                        self.diag_at(msg, first);
                        None
                    }
                    None => decl.map(DeclKind::Object),
                }
            }
            Kind::KwFile => self
                .parse_object_declaration(ObjectClass::File)
                .map(DeclKind::Object),
            Kind::KwPure | Kind::KwImpure | Kind::KwFunction => {
                let spec = self.parse_subprogram_specification();
                self.parse_subprogram_decl_or_body(spec, kind, MALFORMED_FUNCTION)
            }
            Kind::KwProcedure => {
                let spec = self.parse_subprogram_specification();
                self.parse_subprogram_decl_or_body(spec, kind, MALFORMED_PROCEDURE)
            }
            Kind::KwAlias => self.parse_alias_declaration().map(DeclKind::Alias),
            Kind::KwComponent => {
                let not_here = match kind {
                    dp::Entity => Some(NO_COMPONENT_IN_ENTITY),
                    dp::Subprogram => Some(NO_COMPONENT_IN_SUBPROGRAM),
                    dp::PackageBody => Some(NO_COMPONENT_IN_PACKBODY),
                    dp::Process => Some(NO_COMPONENT_IN_PROCESS),
                    _ => None,
                };
                let decl = self.parse_component_declaration();
                match not_here {
                    Some(msg) => {
                        self.diag_at(msg, first);
                        None
                    }
                    None => decl.map(DeclKind::Component),
                }
            }
            Kind::KwFor => {
                let not_here = match kind {
                    dp::Entity => Some(NO_CFG_SPEC_IN_ENTITY),
                    dp::Subprogram => Some(NO_CFG_SPEC_IN_SUBPROGRAM),
                    dp::PackageBody => Some(NO_CFG_SPEC_IN_PACKBODY),
                    dp::Process => Some(NO_CFG_SPEC_IN_PROCESS),
                    _ => None,
                };
                let decl = self.parse_configuration_specification();
                match not_here {
                    Some(msg) => {
                        self.diag_at(msg, first);
                        None
                    }
                    None => decl.map(DeclKind::ConfigSpec),
                }
            }
            Kind::KwAttribute => {
                if self.peek(2) == Kind::KwOf {
                    self.parse_attribute_specification().map(DeclKind::AttrSpec)
                } else if kind == dp::Configuration {
                    self.diag(NO_ATTR_IN_CFG);
                    self.parse_attribute_declaration();
                    None
                } else {
                    self.parse_attribute_declaration().map(DeclKind::Attribute)
                }
            }
            Kind::KwUse => self
                .parse_use_clause_names()
                .map(|names| DeclKind::Use(UseClause { names })),
            Kind::KwGroup => {
                // group declarations are recognized but not modelled
                self.resync_to_next_semicolon(true);
                None
            }
            Kind::KwPackage => {
                if self.version < Version::Vhdl08 {
                    self.diag(NESTED_PACKAGE_VHDL08);
                }
                if kind == dp::Package || kind == dp::PackageBody {
                    self.diag(NO_PACKBODY_IN_PACK);
                }
                self.resync_to_next_semicolon(true);
                None
            }
            Kind::Identifier => {
                // an object declaration with a missing class keyword
                let allowed = matches!(kind, dp::Package | dp::PackageBody | dp::Subprogram);
                if !allowed {
                    self.diag(EXPECTED_OBJECT_CLASS);
                }
                let decl = self.parse_object_declaration(ObjectClass::Variable);
                if allowed {
                    decl.map(DeclKind::Object)
                } else {
                    None
                }
            }
            _ => None,
        };

        let last = self.lexer.previous_location();
        result.map(|kind| DeclarativeItem { span: first.span_to(last), kind })
    }

    // LRM93 4.1
    //
    // type_declaration ::= TYPE identifier IS type_definition ;
    //                    | TYPE identifier ;
    fn parse_type_declaration(&mut self) -> Option<TypeDeclaration> {
        self.consume(Kind::KwType);

        let (identifier, valid) = self.parse_identifier(EXPECTED_TYPE_NAME);

        if self.optional(Kind::Semicolon) {
            // incomplete type declaration
            return valid.then_some(TypeDeclaration { identifier, def: None });
        }

        self.consume(Kind::KwIs);

        let def = match self.current() {
            Kind::KwRange | Kind::LeftPar => self.parse_scalar_type_definition(),
            Kind::KwAccess => self.parse_access_type_definition(),
            Kind::KwFile => self.parse_file_type_definition(),
            Kind::KwRecord | Kind::KwArray => self.parse_composite_type_definition(),
            _ => {
                self.diag(EXPECTING_TYPE_DEF);
                return None;
            }
        };

        self.consume(Kind::Semicolon);

        let def = def?;
        if !valid {
            return None;
        }

        Some(TypeDeclaration { identifier, def: Some(def) })
    }

    // LRM93 4.2
    //
    // subtype_declaration ::= SUBTYPE identifier IS subtype_indication ;
    fn parse_subtype_declaration(&mut self) -> Option<SubtypeDeclaration> {
        self.consume(Kind::KwSubtype);

        let (identifier, valid) = self.parse_identifier(EXPECTED_SUBTYPE_NAME);

        self.consume(Kind::KwIs);

        let indication = self.parse_subtype_indication();

        self.consume(Kind::Semicolon);

        let indication = indication?;
        if !valid {
            return None;
        }
        Some(SubtypeDeclaration { identifier, indication })
    }

    // LRM93 4.2
    //
    // subtype_indication ::= [ RESOLUTION_name ] type_mark [ constraint ]
    pub(crate) fn parse_subtype_indication(&mut self) -> Option<Subtype> {
        let first = self.lexer.current_location();

        if self.current() != Kind::Identifier {
            return None;
        }

        let resolution = if self.peek(0) == Kind::Identifier && self.peek(1) == Kind::Identifier {
            let options = NameOptions {
                allow_qifts: false,
                allow_complex_names: false,
                ..NameOptions::default()
            };
            self.parse_name_with(options).map(Box::new)
        } else {
            None
        };

        let mark = self.parse_type_mark().map(Box::new);

        let constraint = match self.current() {
            Kind::LeftPar => self.parse_index_constraint(),
            Kind::KwRange => self.parse_range_constraint(),
            _ => None,
        };

        Some(Subtype {
            span: first.span_to(self.lexer.previous_location()),
            resolution,
            mark: mark?,
            constraint,
        })
    }

    pub(crate) fn parse_type_mark(&mut self) -> Option<Name> {
        self.parse_name_with(NameOptions { allow_qifts: false, ..NameOptions::default() })
    }

    // LRM93 4.3.1 object declarations (constant, signal, variable, file).
    //
    // The `shared` keyword, signal kinds and the vhdl87/93 file tails are
    // all handled here.
    fn parse_object_declaration(&mut self, class: ObjectClass) -> Option<ObjectDeclaration> {
        let shared = self.optional(Kind::KwShared);
        match class {
            ObjectClass::Constant => self.consume(Kind::KwConstant),
            ObjectClass::Signal => self.consume(Kind::KwSignal),
            ObjectClass::Variable => self.consume(Kind::KwVariable),
            ObjectClass::File => self.consume(Kind::KwFile),
        }

        let identifiers = self.parse_identifier_list();

        self.consume(Kind::Colon);

        let indication = self.parse_subtype_indication();

        let mut signal_kind = None;
        if class == ObjectClass::Signal {
            if self.optional(Kind::KwBus) {
                signal_kind = Some(SignalKind::Bus);
            } else if self.optional(Kind::KwRegister) {
                signal_kind = Some(SignalKind::Register);
            }
        }

        let mut open_kind = None;
        let mut file_name = None;
        let mut value = None;

        if class == ObjectClass::File {
            if self.optional(Kind::KwOpen) {
                if self.version == Version::Vhdl87 {
                    self.diag(OPEN_FILE_VHDL87);
                }
                open_kind = self.parse_expression();
            }

            if self.current() != Kind::KwIs && self.version == Version::Vhdl87 {
                self.diag(FILE_NAME_VHDL87);
            }

            if self.optional(Kind::KwIs) {
                match self.current() {
                    Kind::KwIn | Kind::KwOut => {
                        if self.version != Version::Vhdl87 {
                            self.diag(FILE_MODE_VHDL87);
                        }
                        self.skip();
                    }
                    Kind::KwInout | Kind::KwLinkage => {
                        self.diag(WRONG_FILE_MODE);
                        self.skip();
                    }
                    _ => {}
                }
                file_name = self.parse_expression();
            }
        } else if self.optional(Kind::ColonEq) {
            value = self.parse_expression();
        }

        self.consume(Kind::Semicolon);

        let indication = indication?;
        if identifiers.is_empty() {
            return None;
        }
        if class == ObjectClass::File && file_name.is_none() {
            return None;
        }

        Some(ObjectDeclaration {
            class,
            shared,
            identifiers,
            indication,
            signal_kind,
            value,
            open_kind,
            file_name,
        })
    }

    pub(crate) fn parse_identifier_list(&mut self) -> Vec<Token> {
        let mut result = Vec::new();
        loop {
            if self.current() != Kind::Identifier && self.current() != Kind::ExtendedIdentifier {
                break;
            }
            result.push(self.lexer.current_token());
            self.skip();
            if !self.optional(Kind::Comma) {
                break;
            }
        }
        result
    }

    // LRM93 4.3.3
    //
    // alias_declaration ::=
    //     ALIAS alias_designator [ : subtype_indication ] IS name [ signature ] ;
    fn parse_alias_declaration(&mut self) -> Option<AliasDeclaration> {
        self.consume(Kind::KwAlias);

        let designator = self.lexer.current_token();
        match designator.kind {
            Kind::Identifier | Kind::Character | Kind::StringLiteral => self.skip(),
            _ => {
                self.diag(EXPECTED_ALIAS_DESIGNATOR);
                self.resync_to_next_semicolon(true);
                return None;
            }
        }

        let indication = if self.optional(Kind::Colon) {
            self.parse_subtype_indication()
        } else {
            None
        };

        self.consume(Kind::KwIs);

        let options = NameOptions { allow_signature: true, ..NameOptions::default() };
        let name = self.parse_name_with(options).map(Box::new);

        self.consume(Kind::Semicolon);

        Some(AliasDeclaration { designator, indication, name: name? })
    }

    // LRM93 4.4
    //
    // attribute_declaration ::= ATTRIBUTE identifier : type_mark ;
    fn parse_attribute_declaration(&mut self) -> Option<AttributeDeclaration> {
        self.consume(Kind::KwAttribute);

        let (identifier, valid) = self.parse_identifier(EXPECTED_ATTRIBUTE_IDENTIFIER);

        self.consume(Kind::Colon);

        let type_mark = self.parse_type_mark().map(Box::new);

        self.consume(Kind::Semicolon);

        let type_mark = type_mark?;
        valid.then_some(AttributeDeclaration { identifier, type_mark })
    }

    // LRM93 5.1
    //
    // attribute_specification ::=
    //     ATTRIBUTE attribute_designator OF entity_specification IS expression ;
    fn parse_attribute_specification(&mut self) -> Option<AttributeSpecification> {
        self.consume(Kind::KwAttribute);

        let (designator, valid) = self.parse_identifier(EXPECTED_ATTRIBUTE_IDENTIFIER);

        if self.current() == Kind::Colon {
            self.diag(COLON_IN_ATTR_SPEC);
            self.skip();
        } else {
            self.consume(Kind::KwOf);
        }

        let names = match self.current() {
            Kind::KwAll => EntityNameList::All(self.eat(Kind::KwAll)),
            Kind::KwOthers => EntityNameList::Others(self.eat(Kind::KwOthers)),
            _ => {
                let mut names = Vec::new();
                loop {
                    match self.current() {
                        Kind::Identifier | Kind::Character | Kind::StringLiteral => {
                            names.push(self.lexer.current_token());
                            self.skip();
                        }
                        _ => {
                            self.diag(EXPECTED_IDENT_OR_CHAR);
                            break;
                        }
                    }
                    if !self.optional(Kind::Comma) {
                        break;
                    }
                }
                EntityNameList::Names(names)
            }
        };

        self.consume(Kind::Colon);

        let entity_class = self.lexer.current_token();
        self.skip();

        self.consume(Kind::KwIs);

        let expression = self.parse_expression();

        self.consume(Kind::Semicolon);

        let expression = expression?;
        valid.then_some(AttributeSpecification {
            designator,
            names,
            entity_class,
            expression,
        })
    }

    // LRM93 4.5
    //
    // component_declaration ::=
    //     COMPONENT identifier [ IS ]
    //         [ LOCAL_generic_clause ]
    //         [ LOCAL_port_clause ]
    //     END COMPONENT [ COMPONENT_simple_name ] ;
    fn parse_component_declaration(&mut self) -> Option<ComponentDeclaration> {
        self.consume(Kind::KwComponent);

        let (identifier, valid) = self.parse_identifier(EXPECTED_COMPONENT_IDENTIFIER);

        self.optional(Kind::KwIs);

        let generics = if self.current() == Kind::KwGeneric {
            Some(self.parse_generic_clause())
        } else {
            None
        };

        let ports = if self.current() == Kind::KwPort {
            Some(self.parse_port_clause())
        } else {
            None
        };

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwComponent);
        self.parse_optional_closing_label(identifier);
        self.consume(Kind::Semicolon);

        valid.then_some(ComponentDeclaration {
            identifier,
            generics,
            ports,
            end_kw,
            region: None,
        })
    }

    // LRM93 5.2
    //
    // configuration_specification ::=
    //     FOR component_specification binding_indication ;
    fn parse_configuration_specification(&mut self) -> Option<ConfigurationSpecification> {
        self.consume(Kind::KwFor);

        let (instances, component) = self.parse_component_specification()?;

        self.consume(Kind::KwUse);
        let binding = self.parse_binding_indication();

        self.consume(Kind::Semicolon);

        Some(ConfigurationSpecification { instances, component, binding })
    }

    // ------------------------------------------------------------------------
    // Subprograms (LRM93 2.0)
    // ------------------------------------------------------------------------

    // LRM93 2.1
    //
    // subprogram_specification ::=
    //     [ PURE | IMPURE ] FUNCTION designator [ ( formal_parameter_list ) ]
    //         RETURN type_mark
    //   | PROCEDURE designator [ ( formal_parameter_list ) ]
    pub(crate) fn parse_subprogram_specification(&mut self) -> Option<SubprogramSpec> {
        let (kind, pure) = match self.current() {
            Kind::KwFunction => {
                self.consume(Kind::KwFunction);
                (SubprogramKind::Function, Some(true))
            }
            Kind::KwPure => {
                self.consume(Kind::KwPure);
                self.consume_msg(Kind::KwFunction, PURE_BEFORE_FUNCTION);
                (SubprogramKind::Function, Some(true))
            }
            Kind::KwImpure => {
                self.consume(Kind::KwImpure);
                self.consume_msg(Kind::KwFunction, IMPURE_BEFORE_FUNCTION);
                (SubprogramKind::Function, Some(false))
            }
            Kind::KwProcedure => {
                self.consume(Kind::KwProcedure);
                (SubprogramKind::Procedure, None)
            }
            _ => {
                self.diag(EXPECTING_SUBPROGRAM_SPEC);
                return None;
            }
        };

        let (designator, valid) = self.parse_designator(EXPECTING_SPRGM_DESIGNATOR);

        let mut lparen = None;
        let mut rparen = None;
        let mut parameters = Vec::new();
        if self.current() == Kind::LeftPar {
            lparen = Some(self.eat(Kind::LeftPar));
            let list_kind = if kind == SubprogramKind::Function {
                InterfaceList::Function
            } else {
                InterfaceList::Procedure
            };
            parameters = self.parse_interface_list(list_kind);
            rparen = Some(self.eat(Kind::RightPar));
        }

        let mut return_mark = None;
        if self.current() == Kind::KwReturn {
            self.consume(Kind::KwReturn);
            return_mark = self.parse_type_mark().map(Box::new);
            if kind == SubprogramKind::Procedure {
                self.diag(NO_RETURN_IN_PROC);
            }
        } else if kind == SubprogramKind::Function {
            self.diag(RETURN_IN_FUNC);
            return None;
        }

        if !valid {
            return None;
        }

        Some(SubprogramSpec {
            kind,
            pure,
            designator,
            lparen,
            parameters,
            rparen,
            return_mark,
            region: None,
        })
    }

    /// Either `spec ;` (declaration) or `spec IS ... END` (body).
    fn parse_subprogram_decl_or_body(
        &mut self,
        spec: Option<SubprogramSpec>,
        kind: DeclarativePart,
        malformed: &'static str,
    ) -> Option<DeclKind> {
        if self.current() == Kind::Semicolon {
            self.skip();
            return Some(DeclKind::Subprogram(SubprogramDeclaration { spec: spec? }));
        }

        if self.current() == Kind::KwIs {
            let body = self.parse_subprogram_body(spec?)?;
            if kind == DeclarativePart::Package {
                let msg = if body.spec.kind == SubprogramKind::Function {
                    NO_FUNCTION_BODY_IN_PACKAGE
                } else {
                    NO_PROCEDURE_BODY_IN_PACKAGE
                };
                self.diag(msg);
                return None;
            }
            return Some(DeclKind::SubprogramBody(body));
        }

        self.diag(malformed);
        None
    }

    // LRM93 2.2
    //
    // subprogram_body ::=
    //     subprogram_specification IS
    //         subprogram_declarative_part
    //     BEGIN
    //         subprogram_statement_part
    //     END [ subprogram_kind ] [ designator ] ;
    fn parse_subprogram_body(&mut self, spec: SubprogramSpec) -> Option<SubprogramBody> {
        let is_kw = self.eat(Kind::KwIs);

        let decls = self.parse_many(ParseState::DeclarativePartBegin, |p| {
            p.parse_declarative_item(DeclarativePart::Subprogram)
        });

        let begin_kw = self.eat(Kind::KwBegin);

        let stmts = self.parse_many(ParseState::SequentialStatements, |p| {
            p.parse_sequential_statement()
        });

        let end_kw = self.eat(Kind::KwEnd);
        match spec.kind {
            SubprogramKind::Function => {
                self.optional(Kind::KwFunction);
            }
            SubprogramKind::Procedure => {
                self.optional(Kind::KwProcedure);
            }
        }
        self.parse_optional_closing_designator(Some(spec.designator));
        self.consume(Kind::Semicolon);

        Some(SubprogramBody {
            spec,
            is_kw,
            decls,
            begin_kw,
            stmts,
            end_kw,
            region: None,
        })
    }

    // ------------------------------------------------------------------------
    // Interface lists (LRM93 4.3.2)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_interface_list(&mut self, kind: InterfaceList) -> Vec<DeclarativeItem> {
        self.parse_many_sep(ParseState::InterfaceLists, Kind::Semicolon, move |p| {
            p.parse_interface_element(kind)
        })
    }

    fn parse_interface_element(&mut self, kind: InterfaceList) -> Option<DeclarativeItem> {
        let first = self.lexer.current_location();

        let decl = match self.current() {
            Kind::KwConstant => {
                let not_here = (kind == InterfaceList::Port).then_some(NO_CONSTANT_IN_PORT);
                let d = self.parse_interface_object(ObjectClass::Constant, true);
                self.discard_if(not_here, d)
            }
            Kind::KwSignal => {
                let not_here = (kind == InterfaceList::Generic).then_some(NO_SIGNAL_IN_GENERIC);
                let d = self.parse_interface_object(ObjectClass::Signal, true);
                self.discard_if(not_here, d)
            }
            Kind::KwVariable => {
                let not_here = match kind {
                    InterfaceList::Generic => Some(NO_VARIABLE_IN_GENERIC),
                    InterfaceList::Port => Some(NO_VARIABLE_IN_PORT),
                    _ => None,
                };
                let d = self.parse_interface_object(ObjectClass::Variable, true);
                self.discard_if(not_here, d)
            }
            Kind::KwFile => {
                if self.version == Version::Vhdl87 {
                    self.diag(NO_FILE_IN_VHDL87);
                }
                let not_here = match kind {
                    InterfaceList::Generic => Some(NO_FILE_IN_GENERIC),
                    InterfaceList::Port => Some(NO_FILE_IN_PORT),
                    _ => None,
                };
                let d = self.parse_interface_object(ObjectClass::File, true);
                self.discard_if(not_here, d)
            }
            Kind::Identifier => {
                // no class keyword: generics and function parameters default
                // to constant, ports to signal, procedure parameters to
                // constant for mode in and variable otherwise
                let class = match kind {
                    InterfaceList::Generic | InterfaceList::Function => ObjectClass::Constant,
                    InterfaceList::Port => ObjectClass::Signal,
                    InterfaceList::Procedure => {
                        let keyword_in = crate::lexer::LookParams {
                            look: [Kind::KwIn, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                            stop: [Kind::Invalid; 4],
                            abort: Kind::Semicolon,
                            nest_in: Kind::LeftPar,
                            nest_out: Kind::RightPar,
                            depth: 0,
                        };
                        if self.lexer.look_for(&keyword_in) {
                            ObjectClass::Constant
                        } else {
                            ObjectClass::Variable
                        }
                    }
                };
                self.parse_interface_object(class, false)
            }
            Kind::KwPackage => {
                if self.version < Version::Vhdl08 {
                    self.diag(PACKAGE_ONLY_IN_VHDL08);
                }
                if kind != InterfaceList::Generic {
                    self.diag(PACKAGE_ONLY_IN_GENERIC);
                }
                self.resync_to_next_semicolon(false);
                None
            }
            Kind::KwType => {
                if self.version < Version::Vhdl08 {
                    self.diag(TYPE_ONLY_IN_VHDL08);
                }
                if kind != InterfaceList::Generic {
                    self.diag(TYPE_ONLY_IN_GENERIC);
                }
                self.resync_to_next_semicolon(false);
                None
            }
            Kind::KwProcedure | Kind::KwPure | Kind::KwImpure | Kind::KwFunction => {
                if self.version < Version::Vhdl08 {
                    self.diag(SUBPROGRAM_ONLY_IN_VHDL08);
                }
                if kind != InterfaceList::Generic {
                    self.diag(SUBPROGRAM_ONLY_IN_GENERIC);
                }
                self.resync_to_next_semicolon(false);
                None
            }
            _ => None,
        };

        let last = self.lexer.previous_location();
        decl.map(|d| DeclarativeItem {
            span: first.span_to(last),
            kind: DeclKind::Interface(d),
        })
    }

    fn discard_if(
        &mut self,
        not_here: Option<&'static str>,
        decl: Option<InterfaceDeclaration>,
    ) -> Option<InterfaceDeclaration> {
        match not_here {
            Some(msg) => {
                self.diag(msg);
                None
            }
            None => decl,
        }
    }

    // interface_declaration ::=
    //     [ class ] identifier_list : [ mode ] subtype_indication [ BUS ]
    //     [ := STATIC_expression ]
    fn parse_interface_object(
        &mut self,
        class: ObjectClass,
        class_given: bool,
    ) -> Option<InterfaceDeclaration> {
        if class_given {
            match class {
                ObjectClass::Constant => self.consume(Kind::KwConstant),
                ObjectClass::Signal => self.consume(Kind::KwSignal),
                ObjectClass::Variable => self.consume(Kind::KwVariable),
                ObjectClass::File => self.consume(Kind::KwFile),
            }
        }

        let identifiers = self.parse_identifier_list();

        self.consume(Kind::Colon);

        let (mode, mode_given) = match self.current() {
            Kind::KwIn | Kind::KwOut | Kind::KwInout | Kind::KwBuffer | Kind::KwLinkage => {
                (self.parse_mode(), true)
            }
            _ => (Mode::In, false),
        };

        let indication = self.parse_subtype_indication();

        let bus = self.optional(Kind::KwBus);

        let value = if self.optional(Kind::ColonEq) {
            self.parse_expression()
        } else {
            None
        };

        let indication = indication?;
        if identifiers.is_empty() {
            return None;
        }

        Some(InterfaceDeclaration {
            class,
            class_given,
            identifiers,
            mode,
            mode_given,
            bus,
            indication,
            value,
        })
    }

    pub(crate) fn parse_mode(&mut self) -> Mode {
        let mode = match self.current() {
            Kind::KwIn => Mode::In,
            Kind::KwOut => Mode::Out,
            Kind::KwInout => Mode::Inout,
            Kind::KwBuffer => Mode::Buffer,
            Kind::KwLinkage => Mode::Linkage,
            _ => Mode::In,
        };
        self.skip();
        mode
    }

    // LRM93 4.3.2.2
    //
    // association_list ::= association_element { , association_element }
    pub(crate) fn parse_association_list(&mut self) -> Vec<AssociationElement> {
        let mut result = Vec::new();

        if self.current() == Kind::RightPar {
            self.diag(EMPTY_ASSOC_LIST);
            return result;
        }

        loop {
            if let Some(element) = self.parse_association_element() {
                result.push(element);
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }

        result
    }

    // association_element ::= [ formal_part => ] actual_part
    fn parse_association_element(&mut self) -> Option<AssociationElement> {
        let arrow_ahead = {
            let params = crate::lexer::LookParams {
                look: [Kind::RightArrow, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                stop: [Kind::Comma, Kind::RightPar, Kind::Invalid, Kind::Invalid],
                abort: Kind::Semicolon,
                nest_in: Kind::LeftPar,
                nest_out: Kind::RightPar,
                depth: 0,
            };
            self.lexer.look_for(&params)
        };

        let formal = if arrow_ahead {
            let f = self.parse_name();
            self.consume(Kind::RightArrow);
            f
        } else {
            None
        };

        if self.current() == Kind::KwOpen {
            let open = self.eat(Kind::KwOpen);
            return Some(AssociationElement { formal, actual: None, open: Some(open) });
        }

        let actual = self.parse_expression();
        if actual.is_none() && formal.is_none() {
            return None;
        }

        Some(AssociationElement { formal, actual, open: None })
    }

    // ------------------------------------------------------------------------
    // Type definitions (LRM93 3.0)
    // ------------------------------------------------------------------------

    // scalar_type_definition ::= enumeration_type_definition
    //                          | integer_type_definition
    //                          | floating_type_definition
    //                          | physical_type_definition
    fn parse_scalar_type_definition(&mut self) -> Option<TypeDefinition> {
        let first = self.lexer.current_location();

        match self.current() {
            Kind::KwRange => {
                self.consume(Kind::KwRange);
                let range = self.parse_range()?;

                if self.current() == Kind::KwUnits {
                    return self.parse_physical_type_definition(first, range);
                }

                // an anonymous scalar type: floating when either bound is a
                // real literal
                let is_real = |e: &Expression| {
                    matches!(
                        e.kind,
                        ExprKind::Literal { kind: LiteralKind::Real, .. }
                    )
                };
                let floating = match &range {
                    RangeSpec::Upto { lhs, rhs } | RangeSpec::Downto { lhs, rhs } => {
                        is_real(lhs) || is_real(rhs)
                    }
                    RangeSpec::Attribute(_) => false,
                };

                let kind = if floating {
                    TypeDefKind::Floating { range }
                } else {
                    TypeDefKind::Integer { range }
                };
                Some(TypeDefinition {
                    span: first.span_to(self.lexer.previous_location()),
                    kind,
                })
            }
            Kind::LeftPar => {
                let lparen = self.eat(Kind::LeftPar);

                let mut literals = Vec::new();
                while self.current() != Kind::Eof {
                    match self.current() {
                        Kind::Identifier | Kind::Character => {
                            literals.push(self.lexer.current_token());
                            self.skip();
                        }
                        _ => {
                            self.diag(EXPECTED_IDENT_OR_CHAR);
                            break;
                        }
                    }
                    if self.current() != Kind::Comma {
                        break;
                    }
                    self.consume(Kind::Comma);
                    if self.current() == Kind::RightPar {
                        self.diag_at(super::UNEXPECTED_COMMA, self.lexer.previous_location());
                        break;
                    }
                }

                let rparen = self.eat(Kind::RightPar);

                Some(TypeDefinition {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: TypeDefKind::Enumeration { lparen, literals, rparen },
                })
            }
            _ => {
                self.diag(EXPECTED_SCALAR_TYPE_DEFN);
                None
            }
        }
    }

    // LRM93 3.1.3
    //
    // physical_type_definition ::=
    //     range_constraint
    //         UNITS
    //             primary_unit_declaration
    //             { secondary_unit_declaration }
    //         END UNITS [ simple_name ]
    fn parse_physical_type_definition(
        &mut self,
        first: vhdlsense_base::Location,
        range: RangeSpec,
    ) -> Option<TypeDefinition> {
        let units_kw = self.eat(Kind::KwUnits);

        let (primary, valid) = self.parse_identifier(EXPECTED_PRIMARY_UNIT);
        self.consume(Kind::Semicolon);

        let mut secondaries = Vec::new();
        while self.current() == Kind::Identifier {
            let (identifier, ok) = self.parse_identifier(EXPECTED_PRIMARY_UNIT);
            if !ok {
                break;
            }
            self.consume(Kind::Eq);

            let value = if self.current() == Kind::Integer || self.current() == Kind::Real {
                let t = self.lexer.current_token();
                self.skip();
                Some(t)
            } else {
                None
            };

            let unit = self.lexer.current_token();
            if unit.kind == Kind::Identifier {
                self.skip();
            } else {
                self.diag(EXPECTED_SECONDARY_UNIT);
            }
            self.consume(Kind::Semicolon);

            secondaries.push(SecondaryUnit { identifier, value, unit });
        }

        let end_kw = self.eat(Kind::KwEnd);
        self.consume(Kind::KwUnits);
        if self.current() == Kind::Identifier {
            self.skip();
        }

        valid.then_some(TypeDefinition {
            span: first.span_to(self.lexer.previous_location()),
            kind: TypeDefKind::Physical {
                range,
                units_kw,
                primary,
                secondaries,
                end_kw,
            },
        })
    }

    // LRM93 3.2
    //
    // composite_type_definition ::= array_type_definition
    //                             | record_type_definition
    fn parse_composite_type_definition(&mut self) -> Option<TypeDefinition> {
        let first = self.lexer.current_location();

        match self.current() {
            Kind::KwArray => {
                self.consume(Kind::KwArray);
                self.consume(Kind::LeftPar);

                // `array ( natural range <> )` is unconstrained; spot the box
                // at depth one before the closing parenthesis
                let box_ahead = {
                    let params = crate::lexer::LookParams {
                        look: [Kind::Box, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                        stop: [Kind::RightPar, Kind::Invalid, Kind::Invalid, Kind::Invalid],
                        abort: Kind::Semicolon,
                        nest_in: Kind::LeftPar,
                        nest_out: Kind::RightPar,
                        depth: 1,
                    };
                    self.lexer.look_for(&params)
                };

                if box_ahead {
                    let mut index_marks = Vec::new();
                    loop {
                        if let Some(mark) = self.parse_type_mark() {
                            index_marks.push(mark);
                        }
                        self.consume(Kind::KwRange);
                        self.consume(Kind::Box);
                        if !self.optional(Kind::Comma) {
                            break;
                        }
                    }
                    self.consume(Kind::RightPar);
                    self.consume(Kind::KwOf);
                    let element = self.parse_subtype_indication()?;

                    return Some(TypeDefinition {
                        span: first.span_to(self.lexer.previous_location()),
                        kind: TypeDefKind::UnconstrainedArray { index_marks, element },
                    });
                }

                let mut indices = Vec::new();
                loop {
                    if let Some(r) = self.parse_discrete_range() {
                        indices.push(r);
                    }
                    if !self.optional(Kind::Comma) {
                        break;
                    }
                }
                self.consume(Kind::RightPar);
                self.consume(Kind::KwOf);
                let element = self.parse_subtype_indication()?;

                Some(TypeDefinition {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: TypeDefKind::ConstrainedArray { indices, element },
                })
            }
            Kind::KwRecord => {
                let record_kw = self.eat(Kind::KwRecord);

                let mut elements = Vec::new();
                while self.current() == Kind::Identifier {
                    if let Some(e) = self.parse_element_declaration() {
                        elements.push(e);
                    } else {
                        break;
                    }
                }

                let end_kw = self.eat(Kind::KwEnd);
                self.consume(Kind::KwRecord);
                if self.current() == Kind::Identifier {
                    self.skip();
                }

                Some(TypeDefinition {
                    span: first.span_to(self.lexer.previous_location()),
                    kind: TypeDefKind::Record { record_kw, elements, end_kw, region: None },
                })
            }
            _ => {
                self.diag(EXPECTED_COMPOSITE_TYPE_DEFN);
                None
            }
        }
    }

    // element_declaration ::= identifier_list : element_subtype_definition ;
    fn parse_element_declaration(&mut self) -> Option<ElementDeclaration> {
        let first = self.lexer.current_location();

        let identifiers = self.parse_identifier_list();
        self.consume(Kind::Colon);
        let subtype = self.parse_subtype_indication();
        self.consume(Kind::Semicolon);

        let subtype = subtype?;
        if identifiers.is_empty() {
            return None;
        }

        Some(ElementDeclaration {
            span: first.span_to(self.lexer.previous_location()),
            identifiers,
            subtype,
        })
    }

    // access_type_definition ::= ACCESS subtype_indication
    fn parse_access_type_definition(&mut self) -> Option<TypeDefinition> {
        let first = self.eat(Kind::KwAccess);
        let subtype = self.parse_subtype_indication()?;
        Some(TypeDefinition {
            span: first.span_to(self.lexer.previous_location()),
            kind: TypeDefKind::Access { subtype },
        })
    }

    // file_type_definition ::= FILE OF type_mark
    fn parse_file_type_definition(&mut self) -> Option<TypeDefinition> {
        let first = self.eat(Kind::KwFile);
        self.consume(Kind::KwOf);

        let type_mark = self.parse_type_mark().map(Box::new);

        if self.current() == Kind::LeftPar {
            self.diag(INDEX_CONSTRAINT_NOT_ALLOWED);
            self.resync_to_end_of_rightpar(0);
        }

        Some(TypeDefinition {
            span: first.span_to(self.lexer.previous_location()),
            kind: TypeDefKind::File { type_mark: type_mark? },
        })
    }

    // ------------------------------------------------------------------------
    // Ranges (LRM93 3.1)
    // ------------------------------------------------------------------------

    // range_constraint ::= RANGE range
    pub(crate) fn parse_range_constraint(&mut self) -> Option<Constraint> {
        self.consume(Kind::KwRange);
        self.parse_range().map(Constraint::Range)
    }

    // index_constraint ::= ( discrete_range { , discrete_range } )
    pub(crate) fn parse_index_constraint(&mut self) -> Option<Constraint> {
        self.consume(Kind::LeftPar);

        let mut indices = Vec::new();
        loop {
            if let Some(r) = self.parse_discrete_range() {
                indices.push(r);
            } else {
                self.resync_to_end_of_rightpar(1);
                if indices.is_empty() {
                    return None;
                }
                return Some(Constraint::Index(indices));
            }
            if !self.optional(Kind::Comma) {
                break;
            }
        }

        self.consume(Kind::RightPar);

        Some(Constraint::Index(indices))
    }

    // range ::= RANGE_attribute_name | simple_expression direction simple_expression
    //
    // A range attribute is recognized after the fact: the expression is
    // parsed under a checkpoint; when the next token is not a direction and
    // the expression turned out to be a range attribute, the tokenizer is
    // backtracked and the attribute re-parsed as a range.
    pub(crate) fn parse_range(&mut self) -> Option<RangeSpec> {
        self.lexer.add_checkpoint();

        let e = self.parse_expression();

        match self.current() {
            Kind::KwTo => {
                self.lexer.drop_checkpoint();
                self.consume(Kind::KwTo);
                let rhs = self.parse_expression()?;
                Some(RangeSpec::Upto { lhs: Box::new(e?), rhs: Box::new(rhs) })
            }
            Kind::KwDownto => {
                self.lexer.drop_checkpoint();
                self.consume(Kind::KwDownto);
                let rhs = self.parse_expression()?;
                Some(RangeSpec::Downto { lhs: Box::new(e?), rhs: Box::new(rhs) })
            }
            _ => {
                let Some(e) = e else {
                    self.lexer.drop_checkpoint();
                    return None;
                };

                if !expression_is_range_attribute(&e, self) {
                    self.lexer.drop_checkpoint();
                    self.diag(EXPECTED_TO_DOWNTO);
                    return None;
                }

                self.lexer.backtrack();
                let options = NameOptions { allow_qifts: false, ..NameOptions::default() };
                let name = self.parse_name_with(options)?;
                Some(RangeSpec::Attribute(Box::new(name)))
            }
        }
    }

    // discrete_range ::= DISCRETE_subtype_indication | range
    pub(crate) fn parse_discrete_range(&mut self) -> Option<DiscreteRange> {
        self.lexer.add_checkpoint();

        let e = self.parse_expression();

        match self.current() {
            Kind::KwTo => {
                self.lexer.drop_checkpoint();
                self.consume(Kind::KwTo);
                let rhs = self.parse_expression()?;
                Some(DiscreteRange::Range(RangeSpec::Upto {
                    lhs: Box::new(e?),
                    rhs: Box::new(rhs),
                }))
            }
            Kind::KwDownto => {
                self.lexer.drop_checkpoint();
                self.consume(Kind::KwDownto);
                let rhs = self.parse_expression()?;
                Some(DiscreteRange::Range(RangeSpec::Downto {
                    lhs: Box::new(e?),
                    rhs: Box::new(rhs),
                }))
            }
            _ => {
                let Some(e) = e else {
                    self.lexer.drop_checkpoint();
                    return None;
                };

                // a plain name is a discrete subtype indication
                if let ExprKind::Unresolved { name } = &e.kind {
                    if !matches!(name.kind, NameKind::Attribute { .. }) {
                        self.lexer.backtrack();
                        let indication = self.parse_subtype_indication()?;
                        return Some(DiscreteRange::Subtype(indication));
                    }
                }

                if !expression_is_range_attribute(&e, self) {
                    self.lexer.drop_checkpoint();
                    self.diag(EXPECTED_TO_DOWNTO);
                    return None;
                }

                self.lexer.backtrack();
                let name = self.parse_name()?;
                Some(DiscreteRange::Range(RangeSpec::Attribute(Box::new(name))))
            }
        }
    }
}

/// True when the expression is a bare `name'range` / `name'reverse_range`
/// attribute reference.
fn expression_is_range_attribute(e: &Expression, parser: &mut Parser<'_, '_>) -> bool {
    let ExprKind::Unresolved { name } = &e.kind else {
        return false;
    };
    let Some(attr) = name.attribute_identifier() else {
        return false;
    };
    let text = parser.lexer.strings().resolve(attr.value).to_string();
    text == "range" || text == "reverse_range"
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

    fn package_decls(src: &str) -> Vec<DeclarativeItem> {
        let (mut units, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        match units.remove(0).kind {
            DesignUnitKind::Package(p) => p.decls,
            other => panic!("expected package, got {other:?}"),
        }
    }

    #[test]
    fn constant_declaration_in_package() {
        let decls = package_decls("package p is constant k : integer := 7; end package;");
        assert_eq!(decls.len(), 1);
        match &decls[0].kind {
            DeclKind::Object(o) => {
                assert_eq!(o.class, ObjectClass::Constant);
                assert_eq!(o.identifiers.len(), 1);
                assert!(o.value.is_some());
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn multi_declarator_signal_keeps_every_identifier() {
        let (units, diags) =
            parse("architecture a of e is signal x, y, z : bit; begin end architecture;");
        assert!(diags.is_empty(), "{diags:?}");
        let DesignUnitKind::Architecture(arch) = &units[0].kind else {
            panic!()
        };
        let DeclKind::Object(o) = &arch.decls[0].kind else {
            panic!()
        };
        assert_eq!(o.identifiers.len(), 3);
    }

    #[test]
    fn enumeration_type_definition() {
        let decls = package_decls("package p is type state is (idle, run, done); end package;");
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        let Some(TypeDefinition { kind: TypeDefKind::Enumeration { literals, .. }, .. }) = &t.def
        else {
            panic!("expected enumeration: {t:?}")
        };
        assert_eq!(literals.len(), 3);
    }

    #[test]
    fn integer_vs_floating_type_definition() {
        let decls = package_decls(
            "package p is type i is range 0 to 7; type f is range 0.0 to 1.0; end package;",
        );
        assert!(matches!(
            decls[0].kind,
            DeclKind::Type(TypeDeclaration { def: Some(TypeDefinition { kind: TypeDefKind::Integer { .. }, .. }), .. })
        ));
        assert!(matches!(
            decls[1].kind,
            DeclKind::Type(TypeDeclaration { def: Some(TypeDefinition { kind: TypeDefKind::Floating { .. }, .. }), .. })
        ));
    }

    #[test]
    fn unconstrained_array_detected_by_box() {
        let decls = package_decls(
            "package p is type mem is array (natural range <>) of bit; end package;",
        );
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        assert!(matches!(
            t.def,
            Some(TypeDefinition { kind: TypeDefKind::UnconstrainedArray { .. }, .. })
        ));
    }

    #[test]
    fn constrained_array_with_range() {
        let decls =
            package_decls("package p is type word is array (7 downto 0) of bit; end package;");
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        assert!(matches!(
            t.def,
            Some(TypeDefinition { kind: TypeDefKind::ConstrainedArray { .. }, .. })
        ));
    }

    #[test]
    fn record_type_with_elements() {
        let decls = package_decls(
            "package p is type pair is record x : integer; y : integer; end record; end package;",
        );
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        let Some(TypeDefinition { kind: TypeDefKind::Record { elements, .. }, .. }) = &t.def
        else {
            panic!()
        };
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn signal_not_allowed_in_package_body_is_dropped_with_diagnostic() {
        let (units, diags) =
            parse("package body p is signal s : bit; end package body;");
        let DesignUnitKind::PackageBody(b) = &units[0].kind else { panic!() };
        assert!(b.decls.is_empty());
        assert!(diags.iter().any(|d| d.message().contains("package body")));
    }

    #[test]
    fn function_declaration_and_body() {
        let src = "package body p is
  function plus (a, b : integer) return integer is
  begin
    return a + b;
  end function plus;
end package body;";
        let (units, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let DesignUnitKind::PackageBody(b) = &units[0].kind else { panic!() };
        let DeclKind::SubprogramBody(body) = &b.decls[0].kind else {
            panic!("{:?}", b.decls[0].kind)
        };
        assert_eq!(body.spec.kind, SubprogramKind::Function);
        assert_eq!(body.spec.parameters.len(), 1);
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn function_without_return_is_rejected() {
        let (_, diags) = parse("package p is function f (x : bit) ; end package;");
        assert!(diags.iter().any(|d| d.message().contains("Return")));
    }

    #[test]
    fn interface_defaults_per_list_kind() {
        let src = "entity e is
  generic ( width : integer := 8 );
  port ( d : in bit );
end entity;";
        let (units, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let DesignUnitKind::Entity(e) = &units[0].kind else { panic!() };
        let DeclKind::Interface(g) = &e.generics.as_ref().unwrap().items[0].kind else {
            panic!()
        };
        assert_eq!(g.class, ObjectClass::Constant);
        assert!(!g.class_given);
        let DeclKind::Interface(p) = &e.ports.as_ref().unwrap().items[0].kind else {
            panic!()
        };
        assert_eq!(p.class, ObjectClass::Signal);
        assert_eq!(p.mode, Mode::In);
    }

    #[test]
    fn port_modes_are_recorded() {
        let src = "entity e is port ( a : in bit; b : out bit; c : inout bit ); end entity;";
        let (units, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let DesignUnitKind::Entity(e) = &units[0].kind else { panic!() };
        let items = &e.ports.as_ref().unwrap().items;
        let modes: Vec<Mode> = items
            .iter()
            .map(|i| match &i.kind {
                DeclKind::Interface(d) => d.mode,
                _ => panic!(),
            })
            .collect();
        assert_eq!(modes, vec![Mode::In, Mode::Out, Mode::Inout]);
    }

    #[test]
    fn trailing_semicolon_in_port_list_is_tolerated() {
        let src = "entity e is port ( a : in bit; ); end entity;";
        let (units, diags) = parse(src);
        let DesignUnitKind::Entity(e) = &units[0].kind else { panic!() };
        assert_eq!(e.ports.as_ref().unwrap().items.len(), 1);
        assert!(diags.iter().any(|d| d.message().contains("Ignoring")));
    }

    #[test]
    fn use_clause_as_declarative_item() {
        let decls = package_decls("package p is use work.other.all; end package;");
        assert!(matches!(decls[0].kind, DeclKind::Use(_)));
    }

    #[test]
    fn component_declaration_parses() {
        let src = "architecture a of e is
  component andgate is
    port ( x, y : in bit; z : out bit );
  end component;
begin
end architecture;";
        let (units, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let DesignUnitKind::Architecture(arch) = &units[0].kind else { panic!() };
        assert!(matches!(arch.decls[0].kind, DeclKind::Component(_)));
    }

    #[test]
    fn subtype_declaration_with_constraint() {
        let decls =
            package_decls("package p is subtype nibble is bit_vector(3 downto 0); end package;");
        let DeclKind::Subtype(s) = &decls[0].kind else { panic!() };
        assert!(matches!(s.indication.constraint, Some(Constraint::Index(_))));
    }

    #[test]
    fn incomplete_type_declaration() {
        let decls = package_decls("package p is type node; end package;");
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        assert!(t.def.is_none());
    }

    #[test]
    fn physical_type_definition_with_secondary_units() {
        let decls = package_decls(
            "package p is type distance is range 0 to 1000 units um; mm = 1000 um; end units; end package;",
        );
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        let Some(TypeDefinition { kind: TypeDefKind::Physical { secondaries, .. }, .. }) = &t.def
        else {
            panic!("{t:?}")
        };
        assert_eq!(secondaries.len(), 1);
    }

    #[test]
    fn discrete_range_by_attribute() {
        let decls = package_decls(
            "package p is type t is array (bit_vector'range) of bit; end package;",
        );
        let DeclKind::Type(t) = &decls[0].kind else { panic!() };
        let Some(TypeDefinition { kind: TypeDefKind::ConstrainedArray { indices, .. }, .. }) =
            &t.def
        else {
            panic!("{t:?}")
        };
        assert!(matches!(indices[0], DiscreteRange::Range(RangeSpec::Attribute(_))));
    }
}
