use std::fmt;

use indexmap::IndexMap;

use crate::scope::Declaration;

/// Inferred type of an expression or declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Unknown,
    Null,
    Bool,
    Number,
    String,
    Array(Box<Ty>),
    Object(ObjectTy),
    Function(FunctionTy),
}

/// Members of an object literal, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTy {
    members: IndexMap<Box<str>, Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub ty: Ty,
    /// The key that introduced the member.
    pub declaration: Option<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTy {
    pub name: Box<str>,
    pub params: Vec<Box<str>>,
}

impl ObjectTy {
    /// Adds a member. A repeated key keeps its position and takes the new
    /// type.
    pub(crate) fn insert(&mut self, name: &str, member: Member) {
        self.members.insert(name.into(), member);
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn members(&self) -> impl ExactSizeIterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (&**name, member))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("boolean"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Object(object) if object.members.is_empty() => f.write_str("{}"),
            Self::Object(object) => {
                f.write_str("{ ")?;
                for (i, (name, member)) in object.members().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {}", member.ty)?;
                }
                f.write_str(" }")
            }
            Self::Function(function) => {
                write!(f, "function {}({})", function.name, function.params.join(", "))
            }
        }
    }
}
