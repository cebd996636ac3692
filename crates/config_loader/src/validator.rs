//! 清单校验模块
//!
//! 校验规则：
//! - 引擎参数在合法范围内 (validator 派生规则)
//! - 执行器名称非空
//! - 资源 locator 合法且唯一
//! - 每个资源的 cue 表合法（升序、时间戳唯一、参数在 [0, 1]，页码唯一）

use std::collections::HashSet;

use contracts::{ContractError, HapticManifest};
use validator::Validate;

/// 校验 HapticManifest
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(manifest: &HapticManifest) -> Result<(), ContractError> {
    validate_engine(manifest)?;
    validate_actuator(manifest)?;
    validate_locators(manifest)?;
    validate_assets(manifest)?;
    Ok(())
}

/// 校验引擎参数
fn validate_engine(manifest: &HapticManifest) -> Result<(), ContractError> {
    let Err(errors) = manifest.engine.validate() else {
        return Ok(());
    };

    // 按字段名排序，保证报告的错误稳定
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let Some((field, field_errors)) = fields.into_iter().next() else {
        return Err(ContractError::config_validation("engine", errors.to_string()));
    };

    let message = field_errors
        .iter()
        .map(|e| match &e.message {
            Some(message) => message.to_string(),
            None => format!("failed '{}' check", e.code),
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(ContractError::config_validation(
        format!("engine.{field}"),
        message,
    ))
}

/// 校验执行器配置
fn validate_actuator(manifest: &HapticManifest) -> Result<(), ContractError> {
    if manifest.actuator.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "actuator.name",
            "actuator name cannot be empty",
        ));
    }
    Ok(())
}

/// 校验 locator 唯一性
fn validate_locators(manifest: &HapticManifest) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, asset) in manifest.assets.iter().enumerate() {
        if !seen.insert(asset.locator.as_str()) {
            return Err(ContractError::config_validation(
                format!("assets[{idx}].locator"),
                format!("duplicate locator '{}'", asset.locator),
            ));
        }
    }
    Ok(())
}

/// 校验每个资源的 cue 表
fn validate_assets(manifest: &HapticManifest) -> Result<(), ContractError> {
    for (idx, asset) in manifest.assets.iter().enumerate() {
        asset.to_asset().map_err(|e| {
            ContractError::config_validation(format!("assets[{idx}]"), e.to_string())
        })?;
    }
    Ok(())
}
