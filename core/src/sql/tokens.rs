/// SQL keywords, operators and punctuation.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Statements
    SELECT,
    INSERT,
    UPDATE,
    DELETE,
    CREATE,
    DROP,
    ALTER,

    // Clauses
    DISTINCT,
    FROM,
    WHERE,
    INTO,
    VALUES,
    SET,
    JOIN,
    LEFT,
    INNER,
    ON,
    ORDER,
    GROUP,
    BY,
    ASC,
    DESC,
    LIMIT,
    OFFSET,
    RETURNING,
    AS,

    // DDL
    TABLE,
    INDEX,
    IF,
    EXISTS,
    ADD,
    COLUMN,
    RENAME,
    TO,
    PRIMARY,
    KEY,
    UNIQUE,

    // Predicates
    AND,
    OR,
    NOT,
    NULL,
    IS,
    IN,
    LIKE,

    // Punctuation
    STAR,
    LPAREN,
    RPAREN,
    COMMA,
    SEMI,
    DOT,

    // Comparison
    EQ,
    NE,
    LT,
    GT,
    LE,
    GE,
}

impl Token {
    /// Returns the SQL text for this token.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::INSERT => "INSERT",
            Token::UPDATE => "UPDATE",
            Token::DELETE => "DELETE",
            Token::CREATE => "CREATE",
            Token::DROP => "DROP",
            Token::ALTER => "ALTER",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::INTO => "INTO",
            Token::VALUES => "VALUES",
            Token::SET => "SET",
            Token::JOIN => "JOIN",
            Token::LEFT => "LEFT",
            Token::INNER => "INNER",
            Token::ON => "ON",
            Token::ORDER => "ORDER",
            Token::GROUP => "GROUP",
            Token::BY => "BY",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::RETURNING => "RETURNING",
            Token::AS => "AS",
            Token::TABLE => "TABLE",
            Token::INDEX => "INDEX",
            Token::IF => "IF",
            Token::EXISTS => "EXISTS",
            Token::ADD => "ADD",
            Token::COLUMN => "COLUMN",
            Token::RENAME => "RENAME",
            Token::TO => "TO",
            Token::PRIMARY => "PRIMARY",
            Token::KEY => "KEY",
            Token::UNIQUE => "UNIQUE",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::NULL => "NULL",
            Token::IS => "IS",
            Token::IN => "IN",
            Token::LIKE => "LIKE",
            Token::STAR => "*",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::SEMI => ";",
            Token::DOT => ".",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::GT => ">",
            Token::LE => "<=",
            Token::GE => ">=",
        }
    }

    /// Comparison operators are always surrounded by spaces.
    #[inline]
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ | Token::NE | Token::LT | Token::GT | Token::LE | Token::GE
        )
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
