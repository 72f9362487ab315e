// ABOUTME: Persisted-query hashes for the ARD public gateway.
// ABOUTME: They are tied to the upstream query shapes and must be updated when ARD changes them.

/// The gateway queries the adapter issues, each addressed by a fixed hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Query {
    Item,
    Show,
    Feed,
}

impl Query {
    pub(crate) fn hash(self) -> &'static str {
        match self {
            Query::Item => "b69efa74d0e2623a9104fb94c9ed2e8f1418a68f6457594126d719a2e8ca7174",
            Query::Show => "e98095b5fed901f947f5c6683b82514fad519e7c96db065a52a60f92fbd4591f",
            Query::Feed => "747b8db78443f20a0deb73a8e89ae9b0d26fcf83f2fc732181649698a0875cff",
        }
    }
}

/// One glossary query per index letter. An empty hash means the partition is skipped.
pub(crate) const CHANNEL_LIST_PARTITIONS: [(char, &str); 27] = [
    ('#', ""),
    ('A', "3bfe84dc9887d0991263fb19dc4c5ba501bb5f27db0a06074b9b0e9ecf2c3c27"),
    ('B', "557b3d0694f7d8d589e43c504a980f4090a025b8c2eefa6559b245f2f1a69e16"),
    ('C', "4a35671fa57762f7e94a2aa79dc48f7fa9dde7c25387ecf9b722d37b26cc2d95"),
    ('D', "f942fa0fe653a179d07349a907687544b090751deabe848919fc10949b3e05c6"),
    ('E', "b7c5db273782bed01ae8ed000d7b5c7b6fdacad30b2d88690b1819c131439a61"),
    ('F', "3fc33abce9a66d020a172a15268354acc4139652c4211be02f95ed470fc34962"),
    ('G', "0ea25f94b3f8f4978bd55189392ed6a1874fe66c846a92734a50d3de37e4dad9"),
    ('H', "fa55e3e6db3952d3cfb5a59fbfe413291fa11fdc07fac77b6f97d50478c9e201"),
    ('I', "b5f9682e177cd52d7e1b02800271f0f2128ba738b58e3f8896b0bbfe925d4d72"),
    ('J', "6da769a89ec95b2a50f4c751eb8935e42d826fa26946a2fa0e842e332883473f"),
    ('K', "ac31e2cf0e381196de7e32ceeedfd1a53d67f5b926d86e37763bd00a6d825be3"),
    ('L', "81668bf385abcf876495cdf4280a83431787c647fa42defb82d3096517578ab3"),
    ('M', "7277a409abd703c9c2858834d93a18fdfce0ea0aee3a416a6bdea62a7ac73598"),
    ('N', "dc8b7e99c2aa1397e658fb380fe96d7fb940d18b895c2336f3284751898d48c7"),
    ('O', "7a3a675566f5b17594eb2027ec46b6e9de70da141f8793970fae1d22df3b22c3"),
    ('P', "3a3c88b51baddc0e9a2d1bb7888e4d44ec8901d0f5f448ca477b36e77aac8efd"),
    ('Q', "5ad27bbec3d8fbc6ea7dc74f3cae088f2160120b4a7659ba5ed62e950301a0b6"),
    ('R', "7e8cd2c0c128019fe0885cc61b5320867ec211dcd2f0986238da07598d826587"),
    ('S', "a56ae9754a77be068bc3d87c8bf0d8229a13bd570d4230776bfbb91c0496a022"),
    ('T', "048cd18997a847069d006adf86879944e1b5069ff2258e5cb3c1a37d2265b91e"),
    ('U', "cc8ae75b395d3faa3b338e19815af7d6af4ad8c5f462e1163b2fa8bae5404a54"),
    ('V', "a348091704377530f2b4db50cdf4287859424855aad21d99c64f8454c602698a"),
    ('W', "1c8d95d7f0f74fe53f6021ef9146183f19ababd049b31e0b9eb909ffcf86d6c0"),
    ('X', ""),
    ('Y', "8bc949cd1652c68b4ff28ac9d38c5450fe6e42783428135fe65af3f230414668"),
    ('Z', "cc7a222db4cc330c2a5a74f8cd64157f255dcfec9272b7fe8f742d2e489aae8f"),
];
