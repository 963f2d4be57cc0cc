use super::Projection;

/// Applies two projections one after another.
///
/// Unprojecting runs the inverse of the second projection first.
#[derive(Debug, Clone)]
pub struct ChainProjection<First, Second> {
    first: First,
    second: Second,
}

impl<First, Second> ChainProjection<First, Second>
where
    First: Projection,
    Second: Projection<InPoint = First::OutPoint>,
{
    /// Creates a new chain.
    pub fn new(first: First, second: Second) -> Self {
        Self { first, second }
    }
}

impl<First, Second> Projection for ChainProjection<First, Second>
where
    First: Projection,
    Second: Projection<InPoint = First::OutPoint>,
{
    type InPoint = First::InPoint;
    type OutPoint = Second::OutPoint;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        self.second.project(&self.first.project(input)?)
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        self.first.unproject(&self.second.unproject(input)?)
    }
}
