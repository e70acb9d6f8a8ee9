//! ライフサイクルフェーズ

/// 1回の起動で実行するフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Help,
    Scaffold,
    Start,
    Reboot,
    Reset,
    Update,
}

impl Phase {
    /// ヘルプに表示する順序
    pub const ALL: [Phase; 6] = [
        Phase::Scaffold,
        Phase::Start,
        Phase::Reboot,
        Phase::Reset,
        Phase::Update,
        Phase::Help,
    ];

    /// コマンドラインで指定するフラグ
    pub fn flag(self) -> &'static str {
        match self {
            Phase::Help => "--help",
            Phase::Scaffold => "--first-time",
            Phase::Start => "--start",
            Phase::Reboot => "--reboot",
            Phase::Reset => "--reset",
            Phase::Update => "--update",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Phase::Help => "この使い方を表示",
            Phase::Scaffold => "プロジェクト構成を生成（既存の構成がある場合は確認）",
            Phase::Start => "バッキングサービスの準備完了を待ってからスタック全体を起動",
            Phase::Reboot => "スタックを停止し、ビルドし直して再起動",
            Phase::Reset => "コンテナとボリュームを削除してプロジェクト構成を再生成",
            Phase::Update => "ボリュームを保持したまま最新イメージで再起動",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phase_is_listed_once() {
        for phase in [
            Phase::Help,
            Phase::Scaffold,
            Phase::Start,
            Phase::Reboot,
            Phase::Reset,
            Phase::Update,
        ] {
            assert_eq!(Phase::ALL.iter().filter(|p| **p == phase).count(), 1);
        }
    }

    #[test]
    fn test_flags_are_unique() {
        let mut flags: Vec<_> = Phase::ALL.iter().map(|p| p.flag()).collect();
        flags.sort();
        flags.dedup();
        assert_eq!(flags.len(), Phase::ALL.len());
    }
}
