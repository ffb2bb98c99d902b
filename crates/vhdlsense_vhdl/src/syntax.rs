//! VHDL abstract syntax tree.
//!
//! Every node family is a struct carrying its source range plus a tagged
//! `kind` enum; visitors are exhaustive matches over the tags. Nodes own
//! their children (`Box`/`Vec`), so a design unit frees en bloc when it is
//! replaced. References *between* units never use pointers: a name's
//! `denotes` list holds `(unit, entity)` index pairs that are validated
//! against the owning cache at lookup time, and the `region: Option<RegionId>`
//! back-links are filled in by the binder after parsing.

use vhdlsense_base::{Location, Symbol};

use crate::node::{EntityRef, RegionId};
use crate::token::Token;

// ----------------------------------------------------------------------------
// Design units
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct DesignUnit {
    pub span: Location,
    pub contexts: Vec<ContextItem>,
    pub kind: DesignUnitKind,
}

#[derive(Debug)]
pub enum DesignUnitKind {
    Entity(EntityDecl),
    Architecture(ArchitectureBody),
    Package(PackageDecl),
    PackageBody(PackageBody),
    Configuration(ConfigurationDecl),
}

impl DesignUnit {
    /// The defining identifier token of this unit.
    pub fn identifier(&self) -> Token {
        match &self.kind {
            DesignUnitKind::Entity(e) => e.identifier,
            DesignUnitKind::Architecture(a) => a.identifier,
            DesignUnitKind::Package(p) => p.identifier,
            DesignUnitKind::PackageBody(p) => p.identifier,
            DesignUnitKind::Configuration(c) => c.identifier,
        }
    }

    /// Secondary identifier recorded in the library index: the entity name
    /// for architectures and configurations.
    pub fn secondary_identifier(&self) -> Option<Symbol> {
        match &self.kind {
            DesignUnitKind::Architecture(a) => a.entity_name.simple_identifier(),
            DesignUnitKind::Configuration(c) => c.entity_name.simple_identifier(),
            _ => None,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(
            self.kind,
            DesignUnitKind::Entity(_) | DesignUnitKind::Package(_) | DesignUnitKind::Configuration(_)
        )
    }

    /// Unit identity for cache eviction: same kind, same identifier, same
    /// secondary identifier.
    pub fn same_unit(&self, other: &DesignUnit) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
            && self.identifier().value == other.identifier().value
            && self.secondary_identifier() == other.secondary_identifier()
    }

    /// The region this unit opened, once bound.
    pub fn region(&self) -> Option<RegionId> {
        match &self.kind {
            DesignUnitKind::Entity(e) => e.region,
            DesignUnitKind::Architecture(a) => a.region,
            DesignUnitKind::Package(p) => p.region,
            DesignUnitKind::PackageBody(p) => p.region,
            DesignUnitKind::Configuration(c) => c.region,
        }
    }
}

/// `generic ( ... );` or `port ( ... );`
#[derive(Debug)]
pub struct InterfaceClause {
    pub kw: Location,
    pub lparen: Location,
    pub items: Vec<DeclarativeItem>,
    pub rparen: Location,
}

#[derive(Debug)]
pub struct EntityDecl {
    pub identifier: Token,
    pub is_kw: Location,
    pub generics: Option<InterfaceClause>,
    pub ports: Option<InterfaceClause>,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Option<Location>,
    pub stmts: Vec<ConcurrentStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct ArchitectureBody {
    pub identifier: Token,
    pub entity_name: Box<Name>,
    pub is_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Location,
    pub stmts: Vec<ConcurrentStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct PackageDecl {
    pub identifier: Token,
    pub is_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct PackageBody {
    pub identifier: Token,
    pub is_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct ConfigurationDecl {
    pub identifier: Token,
    pub entity_name: Box<Name>,
    pub is_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub block: Option<BlockConfiguration>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

// ----------------------------------------------------------------------------
// Context clause
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct ContextItem {
    pub span: Location,
    pub kind: ContextItemKind,
}

#[derive(Debug)]
pub enum ContextItemKind {
    /// `library a, b, c;`
    LibraryClause { names: Vec<Token> },
    /// `use a.b.c, d.e.all;`
    UseClause { names: Vec<Name> },
}

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct DeclarativeItem {
    pub span: Location,
    pub kind: DeclKind,
}

#[derive(Debug)]
pub enum DeclKind {
    Type(TypeDeclaration),
    Subtype(SubtypeDeclaration),
    Object(ObjectDeclaration),
    Interface(InterfaceDeclaration),
    Alias(AliasDeclaration),
    Subprogram(SubprogramDeclaration),
    SubprogramBody(SubprogramBody),
    Component(ComponentDeclaration),
    Attribute(AttributeDeclaration),
    AttrSpec(AttributeSpecification),
    ConfigSpec(ConfigurationSpecification),
    Use(UseClause),
}

#[derive(Debug)]
pub struct TypeDeclaration {
    pub identifier: Token,
    /// None for an incomplete type declaration.
    pub def: Option<TypeDefinition>,
}

#[derive(Debug)]
pub struct SubtypeDeclaration {
    pub identifier: Token,
    pub indication: Subtype,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectClass {
    Constant,
    Signal,
    Variable,
    File,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignalKind {
    Register,
    Bus,
}

#[derive(Debug)]
pub struct ObjectDeclaration {
    pub class: ObjectClass,
    pub shared: bool,
    pub identifiers: Vec<Token>,
    pub indication: Subtype,
    pub signal_kind: Option<SignalKind>,
    pub value: Option<Expression>,
    /// `open <expr>` on a vhdl93 file declaration.
    pub open_kind: Option<Expression>,
    /// `is <expr>` file name.
    pub file_name: Option<Expression>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    In,
    Out,
    Inout,
    Buffer,
    Linkage,
}

#[derive(Debug)]
pub struct InterfaceDeclaration {
    pub class: ObjectClass,
    /// Whether the class keyword was written or defaulted.
    pub class_given: bool,
    pub identifiers: Vec<Token>,
    pub mode: Mode,
    pub mode_given: bool,
    pub bus: bool,
    pub indication: Subtype,
    pub value: Option<Expression>,
}

#[derive(Debug)]
pub struct AliasDeclaration {
    pub designator: Token,
    pub indication: Option<Subtype>,
    pub name: Box<Name>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubprogramKind {
    Procedure,
    Function,
}

#[derive(Debug)]
pub struct SubprogramSpec {
    pub kind: SubprogramKind,
    pub pure: Option<bool>,
    pub designator: Token,
    pub lparen: Option<Location>,
    pub parameters: Vec<DeclarativeItem>,
    pub rparen: Option<Location>,
    pub return_mark: Option<Box<Name>>,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct SubprogramDeclaration {
    pub spec: SubprogramSpec,
}

#[derive(Debug)]
pub struct SubprogramBody {
    pub spec: SubprogramSpec,
    pub is_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Location,
    pub stmts: Vec<SequentialStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct ComponentDeclaration {
    pub identifier: Token,
    pub generics: Option<InterfaceClause>,
    pub ports: Option<InterfaceClause>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct AttributeDeclaration {
    pub identifier: Token,
    pub type_mark: Box<Name>,
}

#[derive(Debug)]
pub enum EntityNameList {
    Names(Vec<Token>),
    Others(Location),
    All(Location),
}

#[derive(Debug)]
pub struct AttributeSpecification {
    pub designator: Token,
    pub names: EntityNameList,
    pub entity_class: Token,
    pub expression: Expression,
}

#[derive(Debug)]
pub enum InstantiationList {
    Labels(Vec<Token>),
    Others(Location),
    All(Location),
}

#[derive(Debug)]
pub enum EntityAspect {
    Entity { name: Box<Name>, architecture: Option<Token> },
    Configuration(Box<Name>),
    Open(Location),
}

#[derive(Debug)]
pub struct BindingIndication {
    pub aspect: Option<EntityAspect>,
    pub generic_map: Vec<AssociationElement>,
    pub port_map: Vec<AssociationElement>,
}

#[derive(Debug)]
pub struct ConfigurationSpecification {
    pub instances: InstantiationList,
    pub component: Box<Name>,
    pub binding: BindingIndication,
}

#[derive(Debug)]
pub struct UseClause {
    pub names: Vec<Name>,
}

// ----------------------------------------------------------------------------
// Configuration internals
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct BlockConfiguration {
    pub for_kw: Location,
    pub specification: Box<Name>,
    pub uses: Vec<UseClause>,
    pub items: Vec<ConfigurationItem>,
    pub end_kw: Location,
}

#[derive(Debug)]
pub enum ConfigurationItem {
    Block(BlockConfiguration),
    Component(ComponentConfiguration),
}

#[derive(Debug)]
pub struct ComponentConfiguration {
    pub for_kw: Location,
    pub instances: InstantiationList,
    pub component: Box<Name>,
    pub binding: Option<BindingIndication>,
    pub block: Option<Box<BlockConfiguration>>,
    pub end_kw: Location,
}

// ----------------------------------------------------------------------------
// Types
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct Subtype {
    pub span: Location,
    pub resolution: Option<Box<Name>>,
    pub mark: Box<Name>,
    pub constraint: Option<Constraint>,
}

#[derive(Debug)]
pub enum Constraint {
    Range(RangeSpec),
    Index(Vec<DiscreteRange>),
}

#[derive(Debug)]
pub enum RangeSpec {
    /// `lhs to rhs`
    Upto { lhs: Box<Expression>, rhs: Box<Expression> },
    /// `lhs downto rhs`
    Downto { lhs: Box<Expression>, rhs: Box<Expression> },
    /// `name'range` and friends.
    Attribute(Box<Name>),
}

#[derive(Debug)]
pub enum DiscreteRange {
    Range(RangeSpec),
    Subtype(Subtype),
}

#[derive(Debug)]
pub struct TypeDefinition {
    pub span: Location,
    pub kind: TypeDefKind,
}

#[derive(Debug)]
pub enum TypeDefKind {
    Enumeration {
        lparen: Location,
        literals: Vec<Token>,
        rparen: Location,
    },
    Integer {
        range: RangeSpec,
    },
    Floating {
        range: RangeSpec,
    },
    Physical {
        range: RangeSpec,
        units_kw: Location,
        primary: Token,
        secondaries: Vec<SecondaryUnit>,
        end_kw: Location,
    },
    ConstrainedArray {
        indices: Vec<DiscreteRange>,
        element: Subtype,
    },
    UnconstrainedArray {
        index_marks: Vec<Name>,
        element: Subtype,
    },
    Record {
        record_kw: Location,
        elements: Vec<ElementDeclaration>,
        end_kw: Location,
        region: Option<RegionId>,
    },
    Access {
        subtype: Subtype,
    },
    File {
        type_mark: Box<Name>,
    },
}

/// `micron = 1000 nm;`
#[derive(Debug)]
pub struct SecondaryUnit {
    pub identifier: Token,
    pub value: Option<Token>,
    pub unit: Token,
}

#[derive(Debug)]
pub struct ElementDeclaration {
    pub span: Location,
    pub identifiers: Vec<Token>,
    pub subtype: Subtype,
}

// ----------------------------------------------------------------------------
// Names
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct Name {
    pub span: Location,
    /// The named entities this occurrence may denote; filled by the binder,
    /// empty when unresolved.
    pub denotes: Vec<EntityRef>,
    pub kind: NameKind,
}

#[derive(Debug)]
pub enum NameKind {
    Simple {
        identifier: Token,
    },
    /// `prefix . identifier` (the identifier token may be the reserved word
    /// `all` in a use clause).
    Selected {
        prefix: Box<Name>,
        identifier: Token,
    },
    /// `prefix ( discrete_range )`
    Slice {
        prefix: Box<Name>,
        range: DiscreteRange,
    },
    /// `prefix ( expr, expr, ... )` — indexed name, function call or type
    /// conversion; kept ambiguous until overload resolution.
    Ambiguous {
        prefix: Box<Name>,
        args: Vec<Expression>,
    },
    /// `prefix ( formal => actual, ... )` — call with named association.
    Fcall {
        prefix: Box<Name>,
        args: Vec<AssociationElement>,
    },
    /// `prefix ' identifier [ ( expr ) ]`
    Attribute {
        prefix: Box<Name>,
        identifier: Token,
        expression: Option<Box<Expression>>,
    },
    /// `prefix ' ( expression )`
    Qualified {
        prefix: Box<Name>,
        expression: Box<Expression>,
    },
    /// `prefix [ mark, mark return mark ]`
    Signature {
        prefix: Box<Name>,
        signature: SignatureSpec,
    },
    Error,
}

impl Name {
    pub fn new(span: Location, kind: NameKind) -> Self {
        Name {
            span,
            denotes: Vec::new(),
            kind,
        }
    }

    /// The identifier symbol of a simple name, if this is one.
    pub fn simple_identifier(&self) -> Option<Symbol> {
        match &self.kind {
            NameKind::Simple { identifier } => Some(identifier.value),
            _ => None,
        }
    }

    /// The identifier token that names the "tip" of this name, descending
    /// through complex shapes.
    pub fn designator(&self) -> Option<Token> {
        match &self.kind {
            NameKind::Simple { identifier } => Some(*identifier),
            NameKind::Selected { identifier, .. } => Some(*identifier),
            NameKind::Slice { prefix, .. }
            | NameKind::Ambiguous { prefix, .. }
            | NameKind::Fcall { prefix, .. }
            | NameKind::Qualified { prefix, .. }
            | NameKind::Signature { prefix, .. } => prefix.designator(),
            NameKind::Attribute { identifier, .. } => Some(*identifier),
            NameKind::Error => None,
        }
    }

    /// The attribute designator if this is an attribute name.
    pub fn attribute_identifier(&self) -> Option<Token> {
        match &self.kind {
            NameKind::Attribute { identifier, .. } => Some(*identifier),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SignatureSpec {
    pub span: Location,
    pub marks: Vec<Name>,
    pub return_mark: Option<Box<Name>>,
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LiteralKind {
    Integer,
    Real,
    Character,
    String,
    BitString,
}

#[derive(Debug)]
pub struct Expression {
    pub span: Location,
    pub kind: ExprKind,
}

#[derive(Debug)]
pub enum ExprKind {
    Binary {
        op: Token,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: Token,
        operand: Box<Expression>,
    },
    Literal {
        kind: LiteralKind,
        token: Token,
    },
    /// `10 ns` — abstract literal followed by a unit name.
    Physical {
        token: Token,
        unit: Box<Name>,
    },
    Aggregate {
        elements: Vec<ElementAssociation>,
    },
    /// A name in expression position, resolution deferred to the binder.
    Unresolved {
        name: Box<Name>,
    },
    Allocator {
        subtype: Option<Subtype>,
        qualified: Option<Box<Expression>>,
    },
    Nested {
        expr: Box<Expression>,
    },
    Null,
}

#[derive(Debug)]
pub struct ElementAssociation {
    pub choices: Vec<Choice>,
    pub expression: Expression,
}

#[derive(Debug)]
pub enum Choice {
    Expression(Expression),
    DiscreteRange(DiscreteRange),
    Others(Location),
}

#[derive(Debug)]
pub struct AssociationElement {
    pub formal: Option<Name>,
    pub actual: Option<Expression>,
    pub open: Option<Location>,
}

// ----------------------------------------------------------------------------
// Sequential statements
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct SequentialStatement {
    pub span: Location,
    pub label: Option<Token>,
    pub kind: SeqStmt,
}

#[derive(Debug)]
pub enum SeqStmt {
    Wait {
        on: Vec<Name>,
        until: Option<Expression>,
        timeout: Option<Expression>,
    },
    Assertion {
        condition: Expression,
        report: Option<Expression>,
        severity: Option<Expression>,
    },
    Report {
        report: Expression,
        severity: Option<Expression>,
    },
    SignalAssign {
        target: Target,
        delay: Option<DelayMechanism>,
        waveforms: Vec<WaveformElement>,
    },
    VariableAssign {
        target: Target,
        value: Expression,
    },
    ProcedureCall {
        procedure: Name,
    },
    If(IfStatement),
    ForLoop {
        parameter: ParameterSpec,
        loop_kw: Location,
        body: Vec<SequentialStatement>,
        end_kw: Location,
    },
    WhileLoop {
        /// None for a plain `loop`.
        condition: Option<Expression>,
        loop_kw: Location,
        body: Vec<SequentialStatement>,
        end_kw: Location,
    },
    Case {
        expression: Expression,
        is_kw: Location,
        alternatives: Vec<CaseAlternative>,
        end_kw: Location,
    },
    Next {
        label: Option<Token>,
        when: Option<Expression>,
    },
    Exit {
        label: Option<Token>,
        when: Option<Expression>,
    },
    Return {
        expression: Option<Expression>,
    },
    Null,
}

/// One link of an if/elsif/else chain. `condition` is `None` for a final
/// `else`; `otherwise` points at the next link.
#[derive(Debug)]
pub struct IfStatement {
    pub if_kw: Location,
    pub condition: Option<Expression>,
    pub then_kw: Location,
    pub then_stmts: Vec<SequentialStatement>,
    pub otherwise: Option<Box<SequentialStatement>>,
}

#[derive(Debug)]
pub enum Target {
    Name(Name),
    Aggregate(Expression),
}

#[derive(Debug)]
pub enum DelayMechanism {
    Transport,
    Inertial { reject: Option<Expression> },
}

/// `value [ after time ]`; `value` is `None` for `unaffected`.
#[derive(Debug)]
pub struct WaveformElement {
    pub value: Option<Expression>,
    pub after: Option<Expression>,
}

#[derive(Debug)]
pub struct CaseAlternative {
    pub when_kw: Location,
    pub choices: Vec<Choice>,
    pub stmts: Vec<SequentialStatement>,
}

/// `identifier in discrete_range`
#[derive(Debug)]
pub struct ParameterSpec {
    pub identifier: Token,
    pub range: DiscreteRange,
}

// ----------------------------------------------------------------------------
// Concurrent statements
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct ConcurrentStatement {
    pub span: Location,
    pub label: Option<Token>,
    pub postponed: bool,
    pub kind: ConcStmt,
}

#[derive(Debug)]
pub enum ConcStmt {
    Process(ProcessStatement),
    Block(BlockStatement),
    Assertion {
        condition: Expression,
        report: Option<Expression>,
        severity: Option<Expression>,
    },
    CondAssign {
        target: Target,
        guarded: bool,
        delay: Option<DelayMechanism>,
        waveforms: Vec<ConditionalWaveform>,
    },
    SelAssign {
        with_expr: Expression,
        target: Target,
        guarded: bool,
        delay: Option<DelayMechanism>,
        waveforms: Vec<SelectedWaveform>,
    },
    ProcedureCall {
        procedure: Name,
    },
    Instantiation(ComponentInstantiation),
    ForGenerate(ForGenerate),
    IfGenerate(IfGenerate),
}

#[derive(Debug)]
pub struct BlockStatement {
    pub block_kw: Location,
    pub guard: Option<Expression>,
    pub generics: Option<InterfaceClause>,
    pub generic_map: Vec<AssociationElement>,
    pub ports: Option<InterfaceClause>,
    pub port_map: Vec<AssociationElement>,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Location,
    pub stmts: Vec<ConcurrentStatement>,
    pub end_kw: Location,
}

#[derive(Debug)]
pub struct ProcessStatement {
    pub process_kw: Location,
    pub sensitivity: Vec<Name>,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Location,
    pub stmts: Vec<SequentialStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub enum InstantiatedUnit {
    Component(Box<Name>),
    Entity {
        name: Box<Name>,
        architecture: Option<Token>,
    },
    Configuration(Box<Name>),
}

#[derive(Debug)]
pub struct ComponentInstantiation {
    pub unit: InstantiatedUnit,
    pub generic_map_kw: Option<Location>,
    pub generic_map: Vec<AssociationElement>,
    pub port_map_kw: Option<Location>,
    pub port_map: Vec<AssociationElement>,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct ForGenerate {
    pub parameter: ParameterSpec,
    pub generate_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Option<Location>,
    pub stmts: Vec<ConcurrentStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct IfGenerate {
    pub condition: Expression,
    pub generate_kw: Location,
    pub decls: Vec<DeclarativeItem>,
    pub begin_kw: Option<Location>,
    pub stmts: Vec<ConcurrentStatement>,
    pub end_kw: Location,
    pub region: Option<RegionId>,
}

#[derive(Debug)]
pub struct ConditionalWaveform {
    pub waveforms: Vec<WaveformElement>,
    pub when: Option<Expression>,
}

#[derive(Debug)]
pub struct SelectedWaveform {
    pub waveforms: Vec<WaveformElement>,
    pub choices: Vec<Choice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhdlsense_base::StringTable;

    fn ident(st: &mut StringTable, text: &str) -> Token {
        Token::new(crate::token::Kind::Identifier, st.intern_str(text), Location::default())
    }

    fn entity_unit(st: &mut StringTable, name: &str) -> DesignUnit {
        DesignUnit {
            span: Location::default(),
            contexts: Vec::new(),
            kind: DesignUnitKind::Entity(EntityDecl {
                identifier: ident(st, name),
                is_kw: Location::default(),
                generics: None,
                ports: None,
                decls: Vec::new(),
                begin_kw: None,
                stmts: Vec::new(),
                end_kw: Location::default(),
                region: None,
            }),
        }
    }

    #[test]
    fn same_unit_matches_kind_and_identifier() {
        let mut st = StringTable::new();
        let a = entity_unit(&mut st, "alu");
        let b = entity_unit(&mut st, "alu");
        let c = entity_unit(&mut st, "fpu");
        assert!(a.same_unit(&b));
        assert!(!a.same_unit(&c));
    }

    #[test]
    fn primary_classification() {
        let mut st = StringTable::new();
        let e = entity_unit(&mut st, "alu");
        assert!(e.is_primary());
    }

    #[test]
    fn designator_descends_through_prefixes() {
        let mut st = StringTable::new();
        let inner = Name::new(
            Location::default(),
            NameKind::Simple { identifier: ident(&mut st, "mem") },
        );
        let outer = Name::new(
            Location::default(),
            NameKind::Ambiguous { prefix: Box::new(inner), args: Vec::new() },
        );
        assert_eq!(
            outer.designator().map(|t| t.value),
            Some(st.intern_str("mem"))
        );
    }
}
