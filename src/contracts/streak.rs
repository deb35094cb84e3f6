//! FROG streak contract: one check-in per day keeps the streak alive
use ethers::prelude::*;

abigen!(
    IFrogStreak,
    r#"[
        function checkIn() external
        function streakOf(address account) external view returns (uint256 streak, uint256 lastCheckIn)
    ]"#,
);
