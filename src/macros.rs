// Forwarding impls so binary operators work on any mix of owned values and
// references, in the style of curve25519-dalek's define_*_variants macros.
// The canonical impl is always the &LHS op &RHS one.

macro_rules! define_binop_variants {
  ($Trait:ident, $method:ident, $LHS:ty, $RHS:ty, $Output:ty) => {
    impl<'b> $Trait<&'b $RHS> for $LHS {
      type Output = $Output;
      fn $method(self, rhs: &'b $RHS) -> $Output {
        (&self).$method(rhs)
      }
    }

    impl<'a> $Trait<$RHS> for &'a $LHS {
      type Output = $Output;
      fn $method(self, rhs: $RHS) -> $Output {
        self.$method(&rhs)
      }
    }

    impl $Trait<$RHS> for $LHS {
      type Output = $Output;
      fn $method(self, rhs: $RHS) -> $Output {
        (&self).$method(&rhs)
      }
    }
  };
}
