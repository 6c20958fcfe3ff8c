/// Betting structure for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    NoLimit,
    FixedLimit,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Variant::NoLimit => write!(f, "no_limit"),
            Variant::FixedLimit => write!(f, "fixed_limit"),
        }
    }
}

impl TryFrom<&str> for Variant {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "no_limit" => Ok(Variant::NoLimit),
            "fixed_limit" => Ok(Variant::FixedLimit),
            other => Err(anyhow::anyhow!("invalid variant: {}", other)),
        }
    }
}
