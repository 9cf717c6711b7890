//! Composable boolean predicates over a typed subject. A specification
//! answers `Ok(true)` when the candidate satisfies the rule, `Ok(false)`
//! when it violates it, and `Err` only when a repository lookup could not
//! complete. The two negative outcomes are never conflated.

use crate::error::RepositoryError;

pub trait Specification {
    type Subject: ?Sized;

    fn is_satisfied_by(&self, candidate: &Self::Subject) -> Result<bool, RepositoryError>;

    /// Both specifications hold. Short-circuits: `other` is not evaluated
    /// when `self` already failed.
    fn and<B>(self, other: B) -> And<Self, B>
    where
        Self: Sized,
        B: Specification<Subject = Self::Subject>,
    {
        And {
            left: self,
            right: other,
        }
    }

    /// Either specification holds. Short-circuits: `other` is not
    /// evaluated when `self` already passed.
    fn or<B>(self, other: B) -> Or<Self, B>
    where
        Self: Sized,
        B: Specification<Subject = Self::Subject>,
    {
        Or {
            left: self,
            right: other,
        }
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not { inner: self }
    }

    fn and_not<B>(self, other: B) -> And<Self, Not<B>>
    where
        Self: Sized,
        B: Specification<Subject = Self::Subject>,
    {
        self.and(other.not())
    }

    fn or_not<B>(self, other: B) -> Or<Self, Not<B>>
    where
        Self: Sized,
        B: Specification<Subject = Self::Subject>,
    {
        self.or(other.not())
    }
}

pub struct And<A, B> {
    left: A,
    right: B,
}

impl<A, B> Specification for And<A, B>
where
    A: Specification,
    B: Specification<Subject = A::Subject>,
{
    type Subject = A::Subject;

    fn is_satisfied_by(&self, candidate: &Self::Subject) -> Result<bool, RepositoryError> {
        if !self.left.is_satisfied_by(candidate)? {
            return Ok(false);
        }
        self.right.is_satisfied_by(candidate)
    }
}

pub struct Or<A, B> {
    left: A,
    right: B,
}

impl<A, B> Specification for Or<A, B>
where
    A: Specification,
    B: Specification<Subject = A::Subject>,
{
    type Subject = A::Subject;

    fn is_satisfied_by(&self, candidate: &Self::Subject) -> Result<bool, RepositoryError> {
        if self.left.is_satisfied_by(candidate)? {
            return Ok(true);
        }
        self.right.is_satisfied_by(candidate)
    }
}

pub struct Not<A> {
    inner: A,
}

impl<A> Specification for Not<A>
where
    A: Specification,
{
    type Subject = A::Subject;

    fn is_satisfied_by(&self, candidate: &Self::Subject) -> Result<bool, RepositoryError> {
        Ok(!self.inner.is_satisfied_by(candidate)?)
    }
}
