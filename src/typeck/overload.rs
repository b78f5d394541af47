use crate::lang::FunctionDefinition;
use crate::typeck::types::Datatype;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadError {
    /// No candidate accepts the argument types.
    NoMatch,
    /// This many candidates match equally well.
    Ambiguous(usize),
}

/// Pick the overload for `args`. Arity must match exactly. Candidates whose parameters
/// take every argument without promotion win over ones that need promotion; ambiguity
/// is only reported among candidates of the deciding tier.
pub fn select<'d>(
    candidates: &[&'d FunctionDefinition],
    args: &[Datatype],
) -> Result<&'d FunctionDefinition, OverloadError> {
    let same_arity: Vec<&'d FunctionDefinition> = candidates
        .iter()
        .copied()
        .filter(|f| f.parameters.len() == args.len())
        .collect();

    let exact = matching(&same_arity, args, Datatype::exactly_assignable_to);
    if !exact.is_empty() {
        return single(exact);
    }
    single(matching(&same_arity, args, Datatype::assignable_to))
}

fn matching<'d>(
    candidates: &[&'d FunctionDefinition],
    args: &[Datatype],
    accepts: fn(&Datatype, &Datatype) -> bool,
) -> Vec<&'d FunctionDefinition> {
    candidates
        .iter()
        .copied()
        .filter(|f| f.parameters.iter().zip(args).all(|(p, a)| accepts(a, &p.ty)))
        .collect()
}

fn single(found: Vec<&FunctionDefinition>) -> Result<&FunctionDefinition, OverloadError> {
    match found.len() {
        0 => Err(OverloadError::NoMatch),
        1 => Ok(found[0]),
        n => Err(OverloadError::Ambiguous(n)),
    }
}
