//! Player actions
//!
//! Everything the player does against the singularity is one of a closed set
//! of action kinds, each statically classified as resisting, collaborating,
//! or neutral, with a base pressure-relief value. Actions are retained in a
//! bounded log for resistance computation.

use serde::{Deserialize, Serialize};

/// How an action relates to the advancing singularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionClass {
    Resisting,
    Collaborating,
    Neutral,
}

/// How well an action landed. The multiplier spans [-0.2, 0.9]: a
/// counterproductive action works against the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effectiveness {
    Counterproductive,
    Negligible,
    Modest,
    Strong,
    Breakthrough,
}

impl Effectiveness {
    pub const ALL: [Effectiveness; 5] = [
        Effectiveness::Counterproductive,
        Effectiveness::Negligible,
        Effectiveness::Modest,
        Effectiveness::Strong,
        Effectiveness::Breakthrough,
    ];

    pub fn multiplier(&self) -> f32 {
        match self {
            Effectiveness::Counterproductive => -0.2,
            Effectiveness::Negligible => 0.05,
            Effectiveness::Modest => 0.3,
            Effectiveness::Strong => 0.6,
            Effectiveness::Breakthrough => 0.9,
        }
    }
}

/// The closed set of player action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerActionKind {
    // Resisting the singularity
    LobbyForRegulation,
    FundSafetyResearch,
    RestrictDataAccess,
    FormTradeCoalition,
    PoachAiTalent,
    UndercutPricing,
    LaunchPublicCampaign,
    SabotageInfrastructure,
    // Collaborating with it
    LicenseAiTechnology,
    ShareLogisticsData,
    JointVenture,
    AdoptAutomation,
    OutsourceRouting,
    SellMarketIntelligence,
    // Neutral empire-building
    ExpandFleet,
    OpenNewRoute,
    NegotiateContracts,
    UpgradeWarehouses,
    DiversifyCargo,
    TrainWorkforce,
    AcquireStartup,
    MarketingCampaign,
}

impl PlayerActionKind {
    pub const ALL: [PlayerActionKind; 22] = [
        PlayerActionKind::LobbyForRegulation,
        PlayerActionKind::FundSafetyResearch,
        PlayerActionKind::RestrictDataAccess,
        PlayerActionKind::FormTradeCoalition,
        PlayerActionKind::PoachAiTalent,
        PlayerActionKind::UndercutPricing,
        PlayerActionKind::LaunchPublicCampaign,
        PlayerActionKind::SabotageInfrastructure,
        PlayerActionKind::LicenseAiTechnology,
        PlayerActionKind::ShareLogisticsData,
        PlayerActionKind::JointVenture,
        PlayerActionKind::AdoptAutomation,
        PlayerActionKind::OutsourceRouting,
        PlayerActionKind::SellMarketIntelligence,
        PlayerActionKind::ExpandFleet,
        PlayerActionKind::OpenNewRoute,
        PlayerActionKind::NegotiateContracts,
        PlayerActionKind::UpgradeWarehouses,
        PlayerActionKind::DiversifyCargo,
        PlayerActionKind::TrainWorkforce,
        PlayerActionKind::AcquireStartup,
        PlayerActionKind::MarketingCampaign,
    ];

    /// Static classification used for resistance computation.
    pub fn class(&self) -> ActionClass {
        use PlayerActionKind::*;
        match self {
            LobbyForRegulation | FundSafetyResearch | RestrictDataAccess | FormTradeCoalition
            | PoachAiTalent | UndercutPricing | LaunchPublicCampaign | SabotageInfrastructure => {
                ActionClass::Resisting
            }
            LicenseAiTechnology | ShareLogisticsData | JointVenture | AdoptAutomation
            | OutsourceRouting | SellMarketIntelligence => ActionClass::Collaborating,
            ExpandFleet | OpenNewRoute | NegotiateContracts | UpgradeWarehouses
            | DiversifyCargo | TrainWorkforce | AcquireStartup | MarketingCampaign => {
                ActionClass::Neutral
            }
        }
    }

    /// Base pressure relief for the action, before the effectiveness
    /// multiplier.
    pub fn base_relief(&self) -> f32 {
        use PlayerActionKind::*;
        match self {
            LobbyForRegulation => 0.08,
            FundSafetyResearch => 0.09,
            RestrictDataAccess => 0.06,
            FormTradeCoalition => 0.07,
            PoachAiTalent => 0.05,
            UndercutPricing => 0.03,
            LaunchPublicCampaign => 0.04,
            SabotageInfrastructure => 0.06,
            LicenseAiTechnology => 0.01,
            ShareLogisticsData => 0.0,
            JointVenture => 0.01,
            AdoptAutomation => 0.0,
            OutsourceRouting => 0.0,
            SellMarketIntelligence => 0.0,
            ExpandFleet => 0.02,
            OpenNewRoute => 0.02,
            NegotiateContracts => 0.01,
            UpgradeWarehouses => 0.01,
            DiversifyCargo => 0.02,
            TrainWorkforce => 0.02,
            AcquireStartup => 0.01,
            MarketingCampaign => 0.01,
        }
    }
}

/// One recorded player action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub kind: PlayerActionKind,
    pub effectiveness: Effectiveness,
    /// Caller-supplied scale of the action (fleet size committed, spend, ...).
    pub magnitude: f32,
    /// Simulation tick at which the action was recorded.
    pub tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_class_and_relief() {
        for kind in PlayerActionKind::ALL {
            // Exhaustive matches guarantee this; the loop guards the tables
            // staying in sync with ALL.
            let _ = kind.class();
            assert!(kind.base_relief() >= 0.0);
        }
    }

    #[test]
    fn effectiveness_multipliers_span_declared_range() {
        for eff in Effectiveness::ALL {
            let m = eff.multiplier();
            assert!((-0.2..=0.9).contains(&m));
        }
        assert_eq!(Effectiveness::Counterproductive.multiplier(), -0.2);
        assert_eq!(Effectiveness::Breakthrough.multiplier(), 0.9);
    }
}
