//! 可持久化的确定性随机数生成器（Park–Miller 最小标准 LCG）。
//!
//! 生成器的全部后续输出只由当前状态决定：战斗在回合中途存档后，
//! 读档继续时得到完全相同的随机序列。

use rand::Rng;
use serde::{Deserialize, Serialize};

const MODULUS: i64 = 2_147_483_647;
const MULTIPLIER: i64 = 16_807;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// 由任意整数种子构造；零与负数种子会被折叠到 `[1, MODULUS - 1]`。
    pub fn new(seed: i64) -> Self {
        Self {
            state: normalize(seed),
        }
    }

    /// 为新遭遇战取一个随机种子（不可复现，回放请用 [`SeededRng::new`]）。
    pub fn from_entropy() -> Self {
        let seed = rand::thread_rng().gen_range(1..MODULUS);
        Self::new(seed)
    }

    /// 返回 `[0, 1)` 区间内的浮点数。
    pub fn next(&mut self) -> f64 {
        let advanced = (self.state as i64 * MULTIPLIER) % MODULUS;
        self.state = advanced as u32;
        (advanced - 1) as f64 / (MODULUS - 1) as f64
    }

    /// 返回闭区间 `[min, max]` 内的整数；区间为空时返回 `min`。
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            // 仍然推进一步，保证调用序列与边界无关
            self.next();
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as f64;
        let offset = (self.next() * span).floor() as i64;
        (min as i64 + offset) as i32
    }

    /// 基于 [`SeededRng::next_int`] 的 Fisher–Yates 洗牌。
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as i32) as usize;
            items.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn set_state(&mut self, state: u32) {
        self.state = normalize(state as i64);
    }

    pub fn from_state(state: u32) -> Self {
        Self::new(state as i64)
    }
}

/// 折叠到 `[1, MODULUS - 1]`；0 不是 LCG 的合法状态。
fn normalize(seed: i64) -> u32 {
    let value = seed.rem_euclid(MODULUS);
    if value == 0 {
        (MODULUS - 1) as u32
    } else {
        value as u32
    }
}
