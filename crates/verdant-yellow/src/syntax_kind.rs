use crate::NodeOrToken;

/// Kinds of leaf tokens produced by the tokenizer.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum TokenKind {
    WHITESPACE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    SEMICOLON,
    COLON,
    DOT,

    EQ,
    EQ_EQ,
    BANG,
    BANG_EQ,
    LT,
    LT_EQ,
    GT,
    GT_EQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    AMP_AMP,
    PIPE_PIPE,

    VAR_KW,
    FUNCTION_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    BREAK_KW,
    CONTINUE_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,

    UNKNOWN,
    EOF,
}

impl TokenKind {
    /// Whitespace and comments.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::VAR_KW
                | Self::FUNCTION_KW
                | Self::RETURN_KW
                | Self::IF_KW
                | Self::ELSE_KW
                | Self::WHILE_KW
                | Self::BREAK_KW
                | Self::CONTINUE_KW
                | Self::TRUE_KW
                | Self::FALSE_KW
                | Self::NULL_KW
        )
    }

    /// Resolves an identifier-shaped word to its keyword, if it is one.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "var" => Self::VAR_KW,
            "function" => Self::FUNCTION_KW,
            "return" => Self::RETURN_KW,
            "if" => Self::IF_KW,
            "else" => Self::ELSE_KW,
            "while" => Self::WHILE_KW,
            "break" => Self::BREAK_KW,
            "continue" => Self::CONTINUE_KW,
            "true" => Self::TRUE_KW,
            "false" => Self::FALSE_KW,
            "null" => Self::NULL_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// Literal tokens that carry a value.
    #[inline]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER
                | Self::FLOAT_NUMBER
                | Self::STRING
                | Self::TRUE_KW
                | Self::FALSE_KW
                | Self::NULL_KW
        )
    }
}

/// Kinds of composite nodes.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    SOURCE,
    ERROR,

    VAR_DECL,
    FUNCTION_DECL,
    PARAM_LIST,
    PARAM,
    BLOCK,
    RETURN_STMT,
    IF_STMT,
    ELSE_BRANCH,
    WHILE_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    EXPR_STMT,
    EMPTY_STMT,

    NAME,
    NAME_REF,
    LITERAL,
    PAREN_EXPR,
    PREFIX_EXPR,
    BINARY_EXPR,
    CALL_EXPR,
    ARG_LIST,
    MEMBER_EXPR,
    INDEX_EXPR,
    OBJECT_EXPR,
    OBJECT_PROPERTY,
    ARRAY_EXPR,

    TOMBSTONE,
}

impl SyntaxKind {
    /// Statements that may appear directly in a `SOURCE` or `BLOCK`.
    #[inline]
    pub const fn is_stmt(self) -> bool {
        matches!(
            self,
            Self::VAR_DECL
                | Self::FUNCTION_DECL
                | Self::BLOCK
                | Self::RETURN_STMT
                | Self::IF_STMT
                | Self::WHILE_STMT
                | Self::BREAK_STMT
                | Self::CONTINUE_STMT
                | Self::EXPR_STMT
                | Self::EMPTY_STMT
        )
    }
}

/// Kind of any tree element: either a composite node or a leaf token.
pub type RawKind = NodeOrToken<SyntaxKind, TokenKind>;

impl RawKind {
    #[inline]
    pub const fn is_node(self) -> bool {
        matches!(self, NodeOrToken::Node(_))
    }

    #[inline]
    pub const fn is_token(self) -> bool {
        matches!(self, NodeOrToken::Token(_))
    }

    #[inline]
    pub const fn is_trivia(self) -> bool {
        match self {
            NodeOrToken::Node(_) => false,
            NodeOrToken::Token(kind) => kind.is_trivia(),
        }
    }
}

impl From<SyntaxKind> for RawKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        NodeOrToken::Node(kind)
    }
}

impl From<TokenKind> for RawKind {
    #[inline]
    fn from(kind: TokenKind) -> Self {
        NodeOrToken::Token(kind)
    }
}
