use proptest::prelude::*;

use agora_types::{Address, OperationId, ProposalId, Selector, Timestamp, TokenAmount};

proptest! {
    /// ProposalId roundtrip: new -> as_bytes -> new produces identical id.
    #[test]
    fn proposal_id_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ProposalId::new(bytes);
        prop_assert_eq!(id.as_bytes(), &bytes);
    }

    /// ProposalId::is_zero is true only for all-zero bytes.
    #[test]
    fn proposal_id_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let id = ProposalId::new(bytes);
        prop_assert_eq!(id.is_zero(), bytes == [0u8; 32]);
    }

    /// OperationId bincode serialization roundtrip.
    #[test]
    fn operation_id_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = OperationId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: OperationId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    /// Address display output always parses back to the same address.
    #[test]
    fn address_display_parse(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Selector extraction only looks at the first four bytes.
    #[test]
    fn selector_ignores_tail(head in prop::array::uniform4(0u8..), tail in prop::collection::vec(0u8.., 0..64)) {
        let mut calldata = head.to_vec();
        calldata.extend_from_slice(&tail);
        prop_assert_eq!(Selector::from_calldata(&calldata), Some(Selector::new(head)));
    }

    /// An executor eta never lands before the time it was computed from.
    #[test]
    fn eta_is_never_earlier(now in any::<u64>(), delay in any::<u64>()) {
        let now = Timestamp::new(now);
        let eta = now.plus_secs(delay);
        prop_assert!(eta >= now);
        prop_assert_eq!(eta.as_secs(), now.as_secs().saturating_add(delay));
    }

    /// TokenAmount: checked_add(a, b) == Some(a + b) when no overflow.
    #[test]
    fn token_amount_checked_add(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let sum = TokenAmount::new(a).checked_add(TokenAmount::new(b));
        prop_assert_eq!(sum, Some(TokenAmount::new(a + b)));
    }

    /// TokenAmount: checked_sub returns None when b > a.
    #[test]
    fn token_amount_checked_sub_underflow(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = TokenAmount::new(a).checked_sub(TokenAmount::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(TokenAmount::new(a - b)));
        }
    }

    /// TokenAmount: mul_div never exceeds the input when numerator <= denominator.
    #[test]
    fn token_amount_mul_div_bounded(raw in 0u128..u128::MAX / 4, num in 0u128..=10_000, den in 1u128..=10_000) {
        prop_assume!(num <= den);
        let amount = TokenAmount::new(raw);
        prop_assert!(amount.mul_div(num, den) <= amount);
    }
}
